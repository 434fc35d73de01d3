mod attendance_test;
mod auth_test;
mod health_test;
mod students_test;
mod teachers_test;
