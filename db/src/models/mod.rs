pub mod attendance_record;
pub mod student;
pub mod student_subject;
pub mod subject;
pub mod teacher;
pub mod user;

pub use attendance_record::Entity as AttendanceRecord;
pub use student::Entity as Student;
pub use student_subject::Entity as StudentSubject;
pub use subject::Entity as Subject;
pub use teacher::Entity as Teacher;
pub use user::Entity as User;
