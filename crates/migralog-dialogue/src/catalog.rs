// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed answer-option catalog, keyed by (assistant role, question index).
//!
//! Question indices are 1-based, matching the assistant's prompts.

use migralog_core::{AssistantRole, MigralogError};

/// Answer options for one catalog question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOptions {
    pub options: &'static [&'static str],
    /// Whether the user may answer with free text instead of an option.
    pub is_custom_option_allowed: bool,
}

const YES_NO: &[&str] = &["Да", "Нет"];

const REGISTRATION: &[AnswerOptions] = &[
    // 1: name -- free text.
    AnswerOptions {
        options: &[],
        is_custom_option_allowed: true,
    },
    // 2: diagnosed migraine.
    AnswerOptions {
        options: YES_NO,
        is_custom_option_allowed: false,
    },
    // 3: birthdate -- free text.
    AnswerOptions {
        options: &[],
        is_custom_option_allowed: true,
    },
    // 4: taking medication; "Да" needs a follow-up detail.
    AnswerOptions {
        options: YES_NO,
        is_custom_option_allowed: true,
    },
    // 5: chronic conditions; "Да" needs a follow-up detail.
    AnswerOptions {
        options: YES_NO,
        is_custom_option_allowed: true,
    },
];

const DAILY_SURVEY: &[AnswerOptions] = &[
    // 1: headache today; "Да" needs a follow-up detail.
    AnswerOptions {
        options: YES_NO,
        is_custom_option_allowed: true,
    },
    // 2: pain intensity on the 1-10 scale.
    AnswerOptions {
        options: &["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"],
        is_custom_option_allowed: false,
    },
    // 3: pain area.
    AnswerOptions {
        options: &[
            "висок",
            "теменная область",
            "бровь",
            "глаз",
            "верхняя челюсть",
            "нижняя челюсть",
            "лоб",
            "затылок",
        ],
        is_custom_option_allowed: true,
    },
    // 4: laterality.
    AnswerOptions {
        options: &[
            "с одной стороны справа",
            "с одной стороны слева",
            "с двух сторон",
        ],
        is_custom_option_allowed: true,
    },
    // 5: pain character.
    AnswerOptions {
        options: &[
            "давящая",
            "пульсирующая",
            "сжимающая",
            "ноющая",
            "ощущение прострела",
            "режущая",
            "тупая",
            "пронизывающая",
            "острая",
            "жгучая",
        ],
        is_custom_option_allowed: true,
    },
];

/// Looks up the answer options for a question index of the given role.
///
/// An unknown index is a user-facing "question not found" error, not a
/// crash of the turn.
pub fn lookup(role: AssistantRole, index: u32) -> Result<&'static AnswerOptions, MigralogError> {
    let table = match role {
        AssistantRole::Registration => REGISTRATION,
        AssistantRole::DailySurvey => DAILY_SURVEY,
    };
    index
        .checked_sub(1)
        .and_then(|i| table.get(i as usize))
        .ok_or(MigralogError::UnknownQuestion { role, index })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_roles_carry_five_questions() {
        for role in [AssistantRole::Registration, AssistantRole::DailySurvey] {
            for index in 1..=5 {
                assert!(lookup(role, index).is_ok(), "{role} question {index}");
            }
        }
    }

    #[test]
    fn survey_intensity_scale_has_ten_fixed_options() {
        let options = lookup(AssistantRole::DailySurvey, 2).unwrap();
        assert_eq!(options.options.len(), 10);
        assert!(!options.is_custom_option_allowed);
    }

    #[test]
    fn unknown_indices_error() {
        for index in [0, 6, 9, 100] {
            let err = lookup(AssistantRole::Registration, index).unwrap_err();
            match err {
                MigralogError::UnknownQuestion { index: got, .. } => assert_eq!(got, index),
                other => panic!("expected UnknownQuestion, got {other}"),
            }
        }
    }
}
