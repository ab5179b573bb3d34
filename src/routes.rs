//! Paths of the backend HTTP API, relative to the configured base URL.
//!
//! Identity travels as a plain query parameter; the backend trusts it as is.

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const STUDENT_TESTS: &str = "/student/tests";
pub const TEACHER_TESTS: &str = "/tests/";

pub fn student_test(test_id: i64) -> String {
    format!("/student/tests/{test_id}")
}

pub fn student_submit(student_id: i64) -> String {
    format!("/student/submit?student_id={student_id}")
}

pub fn student_result(result_id: i64, student_id: i64) -> String {
    format!("/student/results/{result_id}?student_id={student_id}")
}

pub fn student_results(student_id: i64) -> String {
    format!("/student/my-results?student_id={student_id}")
}

pub fn create_test(teacher_id: i64) -> String {
    format!("/tests/?teacher_id={teacher_id}")
}

pub fn teacher_test(test_id: i64) -> String {
    format!("/tests/{test_id}")
}

/// Shared by `PUT` and `DELETE`.
pub fn owned_test(test_id: i64, teacher_id: i64) -> String {
    format!("/tests/{test_id}?teacher_id={teacher_id}")
}

pub fn teacher_statistics(teacher_id: i64) -> String {
    format!("/teacher/statistics?teacher_id={teacher_id}")
}

pub fn teacher_results(teacher_id: i64) -> String {
    format!("/teacher/results?teacher_id={teacher_id}")
}

pub fn teacher_results_by_test(test_id: i64, teacher_id: i64) -> String {
    format!("/teacher/results/test/{test_id}?teacher_id={teacher_id}")
}

pub fn teacher_results_by_student(student_id: i64, teacher_id: i64) -> String {
    format!("/teacher/results/student/{student_id}?teacher_id={teacher_id}")
}
