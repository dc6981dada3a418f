//! [`Form`] for editing a [`Student`].

use derive_more::{Display, Error as StdError};
use service::domain::{student, Student};

use crate::{define_error, AsError, Error};

/// Raw input of the [`Student`] edit form.
///
/// Every field is kept as typed, so an invalid [`Form`] can be shown back to
/// the operator unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Form {
    /// Last name input.
    pub last_name: String,

    /// First name input.
    pub first_name: String,

    /// Class input, upper-cased and cut to [`student::Class::LEN`]
    /// characters.
    pub class: String,

    /// Ski-pass days input.
    pub forfait_days: String,

    /// Rental days input.
    pub rental_days: String,

    /// Keycards input.
    pub keycards: String,
}

impl Form {
    /// Separator of the [`Form`] fields in a single input line.
    pub const SEPARATOR: char = ';';

    /// Parses a [`Form`] out of a single input line of
    /// [`Form::SEPARATOR`]-separated fields, in the
    /// `last;first;class;forfait;rental;keycards` order.
    ///
    /// Missing trailing fields are left empty.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut fields = line.split(Self::SEPARATOR).map(str::to_owned);
        let mut next = || fields.next().unwrap_or_default();
        Self {
            last_name: next(),
            first_name: next(),
            class: class_input(&next()),
            forfait_days: next(),
            rental_days: next(),
            keycards: next(),
        }
    }

    /// Validates this [`Form`] into [`student::Fields`].
    ///
    /// Names are trimmed, the class is trimmed and upper-cased, and counts
    /// are read by their leading digits, as [`student::parse_count()`]
    /// does.
    ///
    /// # Errors
    ///
    /// If any of the names or the class is empty, or the class isn't exactly
    /// [`student::Class::LEN`] characters long.
    pub fn validate(&self) -> Result<student::Fields, FormError> {
        let first_name = student::Name::new(&self.first_name);
        let last_name = student::Name::new(&self.last_name);
        let (Some(first_name), Some(last_name)) = (first_name, last_name)
        else {
            return Err(FormError::EmptyFields);
        };
        if self.class.trim().is_empty() {
            return Err(FormError::EmptyFields);
        }
        let class =
            student::Class::new(&self.class).ok_or(FormError::InvalidClass)?;

        Ok(student::Fields {
            first_name,
            last_name,
            class,
            forfait_days: student::parse_count(&self.forfait_days),
            rental_days: student::parse_count(&self.rental_days),
            keycards: student::parse_count(&self.keycards),
        })
    }

    /// Renders this [`Form`] back into a single input line, as accepted by
    /// [`Form::parse()`].
    #[must_use]
    pub fn to_line(&self) -> String {
        [
            &self.last_name,
            &self.first_name,
            &self.class,
            &self.forfait_days,
            &self.rental_days,
            &self.keycards,
        ]
        .map(String::as_str)
        .join(&Self::SEPARATOR.to_string())
    }
}

impl From<&Student> for Form {
    fn from(student: &Student) -> Self {
        Self {
            last_name: student.last_name.clone(),
            first_name: student.first_name.clone(),
            class: student.class.clone(),
            forfait_days: student.forfait_days.to_string(),
            rental_days: student.rental_days.to_string(),
            keycards: student.keycards.to_string(),
        }
    }
}

/// Sanitizes the access code input: keeps digits only, up to four of them.
#[must_use]
pub fn code_input(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).take(4).collect()
}

/// Sanitizes the class input: upper-cases it, up to
/// [`student::Class::LEN`] characters.
#[must_use]
pub fn class_input(input: &str) -> String {
    input
        .to_uppercase()
        .chars()
        .take(student::Class::LEN)
        .collect()
}

/// Error of [`Form::validate()`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum FormError {
    /// A name or the class is empty.
    #[display("Required field is empty")]
    EmptyFields,

    /// Class has a wrong length.
    #[display("Class must be exactly 3 characters long")]
    InvalidClass,
}

impl AsError for FormError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMPTY_FIELDS"]
                #[logout = false]
                #[message = "Veuillez remplir tous les champs"]
                EmptyFields,

                #[code = "INVALID_CLASS"]
                #[logout = false]
                #[message = "La classe doit contenir 3 caractères \
                             (ex: 203, TG1)"]
                InvalidClass,
            }
        }

        Some(match self {
            Self::EmptyFields => Error::EmptyFields.into(),
            Self::InvalidClass => Error::InvalidClass.into(),
        })
    }
}

#[cfg(test)]
mod spec {
    use service::domain::{student, Student};

    use crate::AsError as _;

    use super::{class_input, code_input, Form, FormError};

    #[test]
    fn parses_and_validates_line() {
        let form = Form::parse("  Martin ; Léa ;tg1; 2.5 ;x;1 carte");

        assert_eq!(form.class, "TG1");

        let fields = form.validate().unwrap();
        assert_eq!(fields.last_name.as_ref(), "Martin");
        assert_eq!(fields.first_name.as_ref(), "Léa");
        assert_eq!(fields.class.as_ref(), "TG1");
        assert_eq!(fields.forfait_days, 2);
        assert_eq!(fields.rental_days, 0);
        assert_eq!(fields.keycards, 1);
    }

    #[test]
    fn missing_counts_read_as_zero() {
        let fields = Form::parse("Martin;Léa;203").validate().unwrap();

        assert_eq!(
            (fields.forfait_days, fields.rental_days, fields.keycards),
            (0, 0, 0),
        );
    }

    #[test]
    fn rejects_empty_fields() {
        for line in ["", ";Léa;TG1", "Martin;  ;TG1", "Martin;Léa;", "Martin"] {
            assert_eq!(
                Form::parse(line).validate().unwrap_err(),
                FormError::EmptyFields,
                "`{line}` must be rejected",
            );
        }
    }

    #[test]
    fn rejects_short_class() {
        for line in ["Martin;Léa;T1", "Martin;Léa; T1"] {
            assert_eq!(
                Form::parse(line).validate().unwrap_err(),
                FormError::InvalidClass,
                "`{line}` must be rejected",
            );
        }
    }

    #[test]
    fn errors_are_shown_in_french() {
        let err = FormError::InvalidClass.as_error();

        assert_eq!(
            err.message,
            "La classe doit contenir 3 caractères (ex: 203, TG1)",
        );
        assert!(!err.logout);
        assert_eq!(
            FormError::EmptyFields.as_error().message,
            "Veuillez remplir tous les champs",
        );
    }

    #[test]
    fn sanitizes_inputs() {
        assert_eq!(code_input("12a3 45"), "1234");
        assert_eq!(code_input("abc"), "");
        assert_eq!(class_input("tg12"), "TG1");
        assert_eq!(class_input("a"), "A");
    }

    #[test]
    fn round_trips_student_into_line() {
        let student = Student {
            id: student::Id::new("-1").unwrap(),
            last_name: "Martin".into(),
            first_name: "Léa".into(),
            class: "TG1".into(),
            forfait_days: 1,
            rental_days: 2,
            keycards: 0,
            ..Student::default()
        };

        let form = Form::from(&student);

        assert_eq!(form.to_line(), "Martin;Léa;TG1;1;2;0");
        assert_eq!(Form::parse(&form.to_line()), form);
    }
}
