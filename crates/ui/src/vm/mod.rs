mod course_vm;

pub use course_vm::{CourseCardVm, CourseVm, LessonCardVm, map_course_vm};
