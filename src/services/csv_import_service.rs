use csv::{ReaderBuilder, StringRecord, Trim};

use crate::dto::word_dto::CreateWordPayload;
use crate::utils::validation::{
    clean_list, MAX_ANSWERS, MAX_ANSWER_LEN, MAX_BATCH_WORDS, MAX_MEANING_LEN, MAX_SYNONYMS,
    MAX_SYNONYM_LEN,
};

const COL_MEANING: &str = "japanese_meaning";
const COL_PRIMARY: &str = "primary_answer";
const COL_ALTERNATIVES: &str = "alternative_answers";
const COL_SYNONYMS: &str = "synonyms";

/// Every problem found in the input, in row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRejection {
    pub errors: Vec<String>,
}

impl CsvRejection {
    fn single(message: String) -> Self {
        Self {
            errors: vec![message],
        }
    }
}

struct Columns {
    meaning: Option<usize>,
    primary: Option<usize>,
    alternatives: Option<usize>,
    synonyms: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            meaning: find(COL_MEANING),
            primary: find(COL_PRIMARY),
            alternatives: find(COL_ALTERNATIVES),
            synonyms: find(COL_SYNONYMS),
        }
    }
}

fn field<'r>(record: &'r StringRecord, column: Option<usize>) -> &'r str {
    column.and_then(|i| record.get(i)).unwrap_or("")
}

/// Turns CSV text with a header row into word records.
///
/// Columns: `japanese_meaning`, `primary_answer`, and the optional
/// comma-separated `alternative_answers` and `synonyms`. Each row reports at
/// most one problem and all rows are checked before the result is decided.
pub struct CsvImportService;

impl CsvImportService {
    pub fn parse_words(input: &str) -> Result<Vec<CreateWordPayload>, CsvRejection> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input.as_bytes());

        let columns = match reader.headers() {
            Ok(headers) => Columns::from_headers(headers),
            Err(err) => return Err(CsvRejection::single(format!("CSV parse error: {}", err))),
        };

        let mut words = Vec::new();
        let mut errors = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let row = index + 2;
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    errors.push(format!("row {}: CSV parse error: {}", row, err));
                    continue;
                }
            };
            if record.iter().all(|f| f.is_empty()) {
                continue;
            }

            match Self::parse_row(&record, &columns) {
                Ok(word) => words.push(word),
                Err(message) => errors.push(format!("row {}: {}", row, message)),
            }
        }

        if !errors.is_empty() {
            return Err(CsvRejection { errors });
        }
        if words.is_empty() {
            return Err(CsvRejection::single("no valid word data found".to_string()));
        }
        if words.len() > MAX_BATCH_WORDS {
            return Err(CsvRejection::single(format!(
                "at most {} words can be imported at once (got {})",
                MAX_BATCH_WORDS,
                words.len()
            )));
        }

        Ok(words)
    }

    fn parse_row(record: &StringRecord, columns: &Columns) -> Result<CreateWordPayload, String> {
        let meaning = field(record, columns.meaning);
        if meaning.is_empty() {
            return Err(format!("{} is required", COL_MEANING));
        }
        let primary = field(record, columns.primary);
        if primary.is_empty() {
            return Err(format!("{} is required", COL_PRIMARY));
        }

        let mut answers = vec![primary.to_string()];
        answers.extend(clean_list(field(record, columns.alternatives).split(',')));
        if answers.len() > MAX_ANSWERS {
            return Err(format!(
                "at most {} answers are allowed (got {})",
                MAX_ANSWERS,
                answers.len()
            ));
        }

        let synonyms = clean_list(field(record, columns.synonyms).split(','));
        if synonyms.len() > MAX_SYNONYMS {
            return Err(format!(
                "at most {} synonyms are allowed (got {})",
                MAX_SYNONYMS,
                synonyms.len()
            ));
        }

        if meaning.chars().count() > MAX_MEANING_LEN {
            return Err(format!(
                "{} must be at most {} characters",
                COL_MEANING, MAX_MEANING_LEN
            ));
        }
        if answers.iter().any(|a| a.chars().count() > MAX_ANSWER_LEN) {
            return Err(format!("answers must be at most {} characters", MAX_ANSWER_LEN));
        }
        if synonyms.iter().any(|s| s.chars().count() > MAX_SYNONYM_LEN) {
            return Err(format!("synonyms must be at most {} characters", MAX_SYNONYM_LEN));
        }

        Ok(CreateWordPayload {
            japanese_meaning: meaning.to_string(),
            answers,
            synonyms: if synonyms.is_empty() { None } else { Some(synonyms) },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "japanese_meaning,primary_answer,alternative_answers,synonyms\n";

    fn csv(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out
    }

    #[test]
    fn parses_answers_and_synonyms_from_quoted_lists() {
        let input = csv(&[r#"走る,run,"jog, sprint ","駆ける,疾走する""#, "猫,cat,,"]);
        let words = CsvImportService::parse_words(&input).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].japanese_meaning, "走る");
        assert_eq!(words[0].answers, vec!["run", "jog", "sprint"]);
        assert_eq!(
            words[0].synonyms,
            Some(vec!["駆ける".to_string(), "疾走する".to_string()])
        );
        assert_eq!(words[1].answers, vec!["cat"]);
        assert_eq!(words[1].synonyms, None);
    }

    #[test]
    fn collects_every_row_error() {
        let input = csv(&[",run,,", "猫,,,", "犬,dog,,"]);
        let rejection = CsvImportService::parse_words(&input).unwrap_err();
        assert_eq!(
            rejection.errors,
            vec![
                "row 2: japanese_meaning is required".to_string(),
                "row 3: primary_answer is required".to_string(),
            ]
        );
    }

    #[test]
    fn rejects_too_many_answers_and_synonyms() {
        let alternatives = vec!["a"; 11].join(",");
        let synonyms = vec!["s"; 21].join(",");
        let input = csv(&[
            &format!("走る,run,\"{}\",", alternatives),
            &format!("猫,cat,,\"{}\"", synonyms),
        ]);
        let rejection = CsvImportService::parse_words(&input).unwrap_err();
        assert_eq!(rejection.errors.len(), 2);
        assert!(rejection.errors[0].starts_with("row 2:"));
        assert!(rejection.errors[0].contains("10"));
        assert!(rejection.errors[0].contains("12"));
        assert!(rejection.errors[1].starts_with("row 3:"));
        assert!(rejection.errors[1].contains("20"));
    }

    #[test]
    fn rejects_overlong_fields() {
        let input = csv(&[
            &format!("{},run,,", "あ".repeat(501)),
            &format!("猫,{},,", "x".repeat(256)),
            &format!("犬,dog,,{}", "y".repeat(101)),
        ]);
        let rejection = CsvImportService::parse_words(&input).unwrap_err();
        assert_eq!(rejection.errors.len(), 3);
        assert!(rejection.errors[0].contains("500"));
        assert!(rejection.errors[1].contains("255"));
        assert!(rejection.errors[2].contains("100"));
    }

    #[test]
    fn header_only_input_has_no_valid_words() {
        let rejection = CsvImportService::parse_words(HEADER).unwrap_err();
        assert_eq!(rejection.errors, vec!["no valid word data found".to_string()]);
    }

    #[test]
    fn blank_rows_are_skipped() {
        let input = format!("{}\n走る,run,,\n\n,,,\n", HEADER);
        let words = CsvImportService::parse_words(&input).unwrap();
        assert_eq!(words.len(), 1);
    }

    #[test]
    fn more_than_a_hundred_rows_is_rejected_after_row_checks() {
        let rows: Vec<String> = (0..101).map(|i| format!("単語{},w{},,", i, i)).collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let rejection = CsvImportService::parse_words(&csv(&refs)).unwrap_err();
        assert_eq!(rejection.errors.len(), 1);
        assert!(rejection.errors[0].contains("100"));
        assert!(rejection.errors[0].contains("101"));
    }

    #[test]
    fn headers_are_trimmed_and_may_be_reordered() {
        let input = " primary_answer , japanese_meaning \nrun,走る\n";
        let words = CsvImportService::parse_words(input).unwrap();
        assert_eq!(words[0].japanese_meaning, "走る");
        assert_eq!(words[0].answers, vec!["run"]);
    }
}
