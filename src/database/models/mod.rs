pub mod course;
pub mod user;

pub use course::{Course, CourseFields, CourseSummary, CourseView, CourseWithOwner};
pub use user::{NewUser, User, UserDetail, UserView};
