use course_core::Progress;
use services::PlaybackCoordinator;

/// Snapshot of everything the course screen renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseVm {
    pub current_title: String,
    pub current_lesson_id: Option<String>,
    /// Plain iframe source, used when the scripted player cannot load.
    pub current_embed_url: Option<String>,
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub certificate_ready: bool,
    pub courses: Vec<CourseCardVm>,
}

impl CourseVm {
    #[must_use]
    pub fn progress_label(&self) -> String {
        format!("{} of {} lessons complete", self.completed, self.total)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCardVm {
    pub id: u32,
    pub title: String,
    pub completed: usize,
    pub total: usize,
    pub lessons: Vec<LessonCardVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonCardVm {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub current: bool,
}

#[must_use]
pub fn map_course_vm(coordinator: &PlaybackCoordinator) -> CourseVm {
    let completed = coordinator.tracker().completed();
    let current = coordinator.current_lesson();
    let progress = coordinator.progress();

    let courses = coordinator
        .catalog()
        .courses()
        .iter()
        .map(|course| {
            let course_progress = Progress::course(course, completed);
            CourseCardVm {
                id: course.id().value(),
                title: course.title().to_string(),
                completed: course_progress.completed(),
                total: course_progress.total(),
                lessons: course
                    .lessons()
                    .iter()
                    .map(|lesson| LessonCardVm {
                        id: lesson.id().to_string(),
                        title: lesson.title().to_string(),
                        completed: completed.contains(lesson.id()),
                        current: current.is_some_and(|c| c.id() == lesson.id()),
                    })
                    .collect(),
            }
        })
        .collect();

    CourseVm {
        current_title: current.map_or_else(String::new, |lesson| lesson.title().to_string()),
        current_lesson_id: current.map(|lesson| lesson.id().to_string()),
        current_embed_url: current.map(|lesson| lesson.video().embed_url().to_string()),
        completed: progress.completed(),
        total: progress.total(),
        percent: progress.percent(),
        certificate_ready: progress.is_complete(),
        courses,
    }
}
