pub mod m202601120001_create_users;
pub mod m202601120002_create_teachers;
pub mod m202601120003_create_subjects;
pub mod m202601120004_create_students;
pub mod m202601120005_create_student_subjects;
pub mod m202601120006_create_attendance_records;
