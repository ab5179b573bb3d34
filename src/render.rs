//! Text views. Every function is pure: it turns transport data into the
//! block of text a page prints.

use crate::form::TestForm;
use crate::models::{GradedResult, OptionMark, ResultRow, Statistics, StudentTest, TeacherTestSummary};
use std::fmt::Write;

const NO_DESCRIPTION: &str = "Без описания";

/// Numbers as a browser prints them: `2` rather than `2.0`.
pub fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn description(text: Option<&str>) -> &str {
    match text {
        Some(d) if !d.is_empty() => d,
        _ => NO_DESCRIPTION,
    }
}

pub fn student_test_cards(tests: &[StudentTest]) -> String {
    if tests.is_empty() {
        return "Нет доступных тестов".to_string();
    }
    let mut out = String::new();
    for test in tests {
        let _ = writeln!(out, "[{}] {}", test.id, test.title);
        let _ = writeln!(out, "    {}", description(test.description.as_deref()));
        let _ = writeln!(out, "    Вопросов: {}", test.questions.len());
    }
    out.trim_end().to_string()
}

pub fn teacher_test_cards(tests: &[TeacherTestSummary]) -> String {
    if tests.is_empty() {
        return "Нет созданных тестов".to_string();
    }
    let mut out = String::new();
    for test in tests {
        let _ = writeln!(out, "[{}] {}", test.id, test.title);
        let _ = writeln!(out, "    {}", description(test.description.as_deref()));
        let _ = writeln!(out, "    Вопросов: {}", test.questions_count);
        if let Some(created) = &test.created_at {
            let _ = writeln!(out, "    Создан: {}", created.localized_date());
        }
    }
    out.trim_end().to_string()
}

/// The test being taken. Options are numbered from 1 within each question.
pub fn test_sheet(test: &StudentTest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", test.title);
    if let Some(d) = test.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "{d}");
    }
    for (index, question) in test.questions.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Вопрос {}: {}", index + 1, question.question_text);
        for (n, option) in question.options.iter().enumerate() {
            let _ = writeln!(out, "  {}) [ ] {}", n + 1, option.option_text);
        }
    }
    out.trim_end().to_string()
}

fn mark_prefix(mark: OptionMark) -> &'static str {
    match mark {
        OptionMark::CorrectSelected => "+",
        OptionMark::CorrectMissed => "~",
        OptionMark::IncorrectSelected => "-",
        OptionMark::Neutral => " ",
    }
}

pub fn graded_result(result: &GradedResult) -> String {
    let mut out = String::new();
    if let Some(title) = &result.test_title {
        let _ = writeln!(out, "== {title} ==");
    }
    let _ = writeln!(out, "{} / {}", result.score, result.total_questions);
    let _ = writeln!(out, "Процент правильных ответов: {}%", result.percentage());
    let _ = writeln!(out);
    let _ = writeln!(out, "Детальные результаты");
    for (index, question) in result.questions.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Вопрос {}: {}", index + 1, question.question_text);
        for option in &question.options {
            let mark = option.mark();
            let checkbox = if option.was_selected { "[x]" } else { "[ ]" };
            let mut line = format!("  {} {} {}", mark_prefix(mark), checkbox, option.text);
            if option.is_correct {
                line.push_str(" ✓ (правильно)");
            }
            if mark == OptionMark::IncorrectSelected {
                line.push_str(" ✗ (неправильно)");
            }
            let _ = writeln!(out, "{line}");
        }
        let verdict = if question.is_correct { "✓ Правильно" } else { "✗ Неправильно" };
        let _ = writeln!(out, "  {verdict}");
    }
    out.trim_end().to_string()
}

pub fn my_results_table(results: &[ResultRow]) -> String {
    if results.is_empty() {
        return "Нет результатов".to_string();
    }
    let mut out = String::from("Результат | Тест | Баллы | Дата\n");
    for row in results {
        let _ = writeln!(
            out,
            "#{} | {} | {} / {} ({}%) | {}",
            row.id,
            row.test_title,
            row.score,
            row.total_questions,
            row.percentage(),
            row.completed_at.localized()
        );
    }
    out.trim_end().to_string()
}

pub fn all_results_table(results: &[ResultRow]) -> String {
    if results.is_empty() {
        return "Нет результатов".to_string();
    }
    let mut out = String::from("Студент | Тест | Баллы | Дата\n");
    for row in results {
        let _ = writeln!(
            out,
            "{} | {} | {} / {} ({}%) | {}",
            row.username,
            row.test_title,
            row.score,
            row.total_questions,
            row.percentage(),
            row.completed_at.localized()
        );
    }
    out.trim_end().to_string()
}

pub fn statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Всего тестов: {}", stats.total_tests);
    let _ = writeln!(out, "Студентов: {}", stats.total_students);
    let _ = writeln!(out, "Попыток прохождения: {}", stats.total_attempts);
    let _ = writeln!(out);
    let _ = writeln!(out, "Тест | Попыток | Средний балл | Средний процент");
    if stats.tests_statistics.is_empty() {
        let _ = writeln!(out, "Нет данных");
    }
    for test in &stats.tests_statistics {
        let _ = writeln!(
            out,
            "{} | {} | {} | {}%",
            test.test_title,
            test.attempts,
            number(test.avg_score),
            number(test.avg_percentage)
        );
    }
    out.trim_end().to_string()
}

/// Editor view of a form, with the row ids the editor commands refer to.
pub fn form(form: &TestForm) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", form.target().heading());
    let _ = writeln!(out, "Название: {}", form.title);
    let _ = writeln!(out, "Описание: {}", form.description);
    for (index, question) in form.questions().iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Вопрос {} [q{}]: {}", index + 1, question.id, question.text);
        for option in &question.options {
            let flag = if option.is_correct { "[x]" } else { "[ ]" };
            let _ = writeln!(out, "  {} [o{}] {}", flag, option.id, option.text);
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GradedOption, GradedQuestion, StudentOption, StudentQuestion, TestStatistics, Timestamp};

    fn ts() -> Timestamp {
        Timestamp::parse("2024-05-01T14:30:00").unwrap()
    }

    #[test]
    fn placeholders_for_empty_lists() {
        assert_eq!(student_test_cards(&[]), "Нет доступных тестов");
        assert_eq!(teacher_test_cards(&[]), "Нет созданных тестов");
        assert_eq!(my_results_table(&[]), "Нет результатов");
        assert_eq!(all_results_table(&[]), "Нет результатов");
        let stats = Statistics {
            total_tests: 0,
            total_students: 2,
            total_attempts: 0,
            tests_statistics: vec![],
        };
        let text = statistics(&stats);
        assert!(text.contains("Студентов: 2"));
        assert!(text.ends_with("Нет данных"));
    }

    #[test]
    fn cards_fall_back_to_no_description() {
        let tests = vec![StudentTest {
            id: 4,
            title: "Химия".into(),
            description: None,
            questions: vec![StudentQuestion {
                id: 1,
                question_text: "H2O?".into(),
                options: vec![StudentOption { id: 1, option_text: "вода".into() }],
            }],
        }];
        let text = student_test_cards(&tests);
        assert!(text.contains("[4] Химия"));
        assert!(text.contains("Без описания"));
        assert!(text.contains("Вопросов: 1"));

        let mut described = tests.clone();
        described[0].description = Some(String::new());
        assert!(student_test_cards(&described).contains("Без описания"));
        described[0].description = Some("  ".into());
        assert!(!student_test_cards(&described).contains("Без описания"));
    }

    #[test]
    fn graded_result_marks_each_option() {
        let result = GradedResult {
            id: 1,
            score: 1,
            total_questions: 3,
            completed_at: ts(),
            test_title: None,
            questions: vec![GradedQuestion {
                question_text: "Чётные".into(),
                is_correct: false,
                options: vec![
                    GradedOption { id: None, text: "2".into(), is_correct: true, was_selected: true },
                    GradedOption { id: None, text: "4".into(), is_correct: true, was_selected: false },
                    GradedOption { id: None, text: "3".into(), is_correct: false, was_selected: true },
                    GradedOption { id: None, text: "5".into(), is_correct: false, was_selected: false },
                ],
            }],
        };
        let text = graded_result(&result);
        assert!(text.contains("Процент правильных ответов: 33%"));
        assert!(text.contains("+ [x] 2 ✓ (правильно)"));
        assert!(text.contains("~ [ ] 4 ✓ (правильно)"));
        assert!(text.contains("- [x] 3 ✗ (неправильно)"));
        assert!(text.contains("    [ ] 5\n"));
        assert!(text.ends_with("✗ Неправильно"));
    }

    #[test]
    fn result_rows_show_percentage_and_local_date() {
        let rows = vec![ResultRow {
            id: 9,
            user_id: Some(2),
            test_id: Some(1),
            score: 2,
            total_questions: 3,
            completed_at: ts(),
            username: "petr".into(),
            test_title: "Алгебра".into(),
        }];
        assert!(all_results_table(&rows).contains("petr | Алгебра | 2 / 3 (67%) | 01.05.2024, 14:30:00"));
        assert!(my_results_table(&rows).contains("#9 | Алгебра | 2 / 3 (67%)"));
    }

    #[test]
    fn statistics_numbers_like_a_browser() {
        let stats = Statistics {
            total_tests: 1,
            total_students: 1,
            total_attempts: 2,
            tests_statistics: vec![TestStatistics {
                test_id: Some(1),
                test_title: "Алгебра".into(),
                attempts: 2,
                avg_score: 1.5,
                avg_percentage: 50.0,
            }],
        };
        assert!(statistics(&stats).contains("Алгебра | 2 | 1.5 | 50%"));
    }

    #[test]
    fn form_view_lists_row_ids() {
        let form = TestForm::create();
        let text = super::form(&form);
        assert!(text.starts_with("== Создание теста =="));
        assert!(text.contains("Вопрос 1 [q1]"));
        assert!(text.contains("[ ] [o1]"));
        assert!(text.contains("[ ] [o2]"));
    }
}
