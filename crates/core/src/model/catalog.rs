use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId, ParseIdError, VideoRef};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("course title cannot be empty")]
    EmptyCourseTitle,

    #[error("lesson title cannot be empty")]
    EmptyLessonTitle,

    #[error("duplicate course id {0}")]
    DuplicateCourse(CourseId),

    #[error("duplicate lesson id {0}")]
    DuplicateLesson(LessonId),

    #[error("invalid identifier: {0}")]
    InvalidId(#[from] ParseIdError),

    #[error("malformed catalog: {0}")]
    Malformed(String),
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Atomic unit of content, bound to one external video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    video: VideoRef,
}

impl Lesson {
    /// Creates a new Lesson.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyLessonTitle` if the title is blank.
    pub fn new(id: LessonId, title: impl Into<String>, video: VideoRef) -> Result<Self, CatalogError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(CatalogError::EmptyLessonTitle);
        }
        Ok(Self { id, title, video })
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn video(&self) -> &VideoRef {
        &self.video
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Ordered grouping of lessons under a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    lessons: Vec<Lesson>,
}

impl Course {
    /// Creates a new Course.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyCourseTitle` if the title is blank.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        lessons: Vec<Lesson>,
    ) -> Result<Self, CatalogError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(CatalogError::EmptyCourseTitle);
        }
        Ok(Self { id, title, lessons })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Read-only course catalog, fixed for the lifetime of the process.
///
/// Lesson ids are unique across all courses, so a lesson can be looked up
/// without knowing its course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    /// Builds a catalog from courses, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateCourse` or `CatalogError::DuplicateLesson`
    /// when ids collide.
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut course_ids = HashSet::new();
        let mut lesson_ids = HashSet::new();
        for course in &courses {
            if !course_ids.insert(course.id()) {
                return Err(CatalogError::DuplicateCourse(course.id()));
            }
            for lesson in course.lessons() {
                if !lesson_ids.insert(lesson.id()) {
                    return Err(CatalogError::DuplicateLesson(lesson.id().clone()));
                }
            }
        }
        Ok(Self { courses })
    }

    /// Catalog with no courses.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            courses: Vec::new(),
        }
    }

    /// The two React courses the viewer ships with.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_CATALOG).expect("built-in catalog is valid")
    }

    /// Parses a catalog file.
    ///
    /// The format is an array of `{ id, title, lessons: [{ id, title, videoId }] }`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Malformed` if the JSON does not match the format,
    /// or any validation error from [`Catalog::new`].
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let courses: Vec<CourseFile> =
            serde_json::from_str(raw).map_err(|err| CatalogError::Malformed(err.to_string()))?;

        let courses = courses
            .into_iter()
            .map(|course| {
                let lessons = course
                    .lessons
                    .into_iter()
                    .map(|lesson| {
                        Lesson::new(
                            LessonId::new(lesson.id)?,
                            lesson.title,
                            VideoRef::new(lesson.video_id)?,
                        )
                    })
                    .collect::<Result<Vec<_>, CatalogError>>()?;
                Course::new(CourseId::new(course.id), course.title, lessons)
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Self::new(courses)
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Lessons of every course, in display order.
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.courses.iter().flat_map(|course| course.lessons().iter())
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons().find(|lesson| lesson.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &LessonId) -> bool {
        self.lesson(id).is_some()
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.courses.iter().map(|course| course.lessons().len()).sum()
    }

    /// First lesson of the first course that has any; the default selection.
    #[must_use]
    pub fn first_lesson(&self) -> Option<&Lesson> {
        self.lessons().next()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lesson_count() == 0
    }
}

#[derive(Deserialize)]
struct CourseFile {
    id: u32,
    title: String,
    lessons: Vec<LessonFile>,
}

#[derive(Deserialize)]
struct LessonFile {
    id: String,
    title: String,
    #[serde(rename = "videoId")]
    video_id: String,
}

const BUILTIN_CATALOG: &str = r#"[
  {
    "id": 1,
    "title": "React Basics",
    "lessons": [
      { "id": "r1", "title": "Intro to React", "videoId": "dGcsHMXbSOA" },
      { "id": "r2", "title": "State and Props", "videoId": "w7ejDZ8SWv8" },
      { "id": "r3", "title": "Hooks Overview", "videoId": "TNhaISOUy6Q" }
    ]
  },
  {
    "id": 2,
    "title": "Advanced React",
    "lessons": [
      { "id": "a1", "title": "Context API", "videoId": "35lXWvCuM8o" },
      { "id": "a2", "title": "React Router", "videoId": "Law7wfdg_ls" },
      { "id": "a3", "title": "Performance Optimization", "videoId": "0ZJgIjIuY7U" }
    ]
  }
]"#;
