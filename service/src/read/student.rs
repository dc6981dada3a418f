//! [`Student`] read model definitions.

use common::Money;

use crate::domain::{student, Bill, Student};

/// Search filter over the [`Student`]s of a [`Roster`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Filter(String);

impl Filter {
    /// Creates a new [`Filter`] out of the provided search text.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().to_lowercase())
    }

    /// Checks whether this [`Filter`] keeps every [`Student`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks whether the provided [`Student`]'s last name, first name or
    /// class contains this [`Filter`]'s text, ignoring case.
    #[must_use]
    pub fn matches(&self, student: &Student) -> bool {
        self.is_empty()
            || [&student.last_name, &student.first_name, &student.class]
                .into_iter()
                .any(|field| field.to_lowercase().contains(&self.0))
    }
}

/// [`Student`] along with its [`Bill`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    /// Billed [`Student`].
    pub student: Student,

    /// [`Bill`] of the [`Student`].
    pub bill: Bill,
}

/// Aggregates over a set of [`Row`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Totals {
    /// Number of [`Row`]s.
    pub count: usize,

    /// Sum of [`Bill::total`]s.
    pub total: Money,

    /// Sum of [`Bill::savings`].
    pub savings: Money,
}

impl<'r> FromIterator<&'r Row> for Totals {
    fn from_iter<I: IntoIterator<Item = &'r Row>>(rows: I) -> Self {
        rows.into_iter().fold(Self::default(), |acc, row| Self {
            count: acc.count + 1,
            total: acc.total + row.bill.total,
            savings: acc.savings + row.bill.savings,
        })
    }
}

/// Filtered view of a [`Roster`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct View {
    /// [`Row`]s kept by the [`Filter`], in [`Roster`] order.
    pub rows: Vec<Row>,

    /// [`Totals`] over the kept [`Row`]s.
    pub totals: Totals,
}

/// Every [`Student`] with a freshly computed [`Bill`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Roster {
    /// [`Row`]s, in the store's key order.
    rows: Vec<Row>,
}

impl Roster {
    /// Creates a new [`Roster`] billing the provided [`Student`]s.
    #[must_use]
    pub fn new(students: Vec<Student>) -> Self {
        Self {
            rows: students
                .into_iter()
                .map(|student| Row {
                    bill: Bill::of(&student),
                    student,
                })
                .collect(),
        }
    }

    /// Returns every [`Row`] of this [`Roster`].
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Checks whether this [`Roster`] has no [`Row`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up the [`Row`] of the [`Student`] with the provided ID.
    #[must_use]
    pub fn get(&self, id: &student::Id) -> Option<&Row> {
        self.rows.iter().find(|row| &row.student.id == id)
    }

    /// Returns the [`View`] of this [`Roster`] kept by the provided
    /// [`Filter`].
    #[must_use]
    pub fn view(&self, filter: &Filter) -> View {
        let rows: Vec<_> = self
            .rows
            .iter()
            .filter(|row| filter.matches(&row.student))
            .cloned()
            .collect();
        View {
            totals: rows.iter().collect(),
            rows,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::domain::{student, Student};

    use super::{Filter, Roster};

    fn student(id: &str, last: &str, first: &str, class: &str) -> Student {
        Student {
            id: student::Id::new(id).unwrap(),
            last_name: last.into(),
            first_name: first.into(),
            class: class.into(),
            forfait_days: 1,
            ..Student::default()
        }
    }

    fn roster() -> Roster {
        Roster::new(vec![
            student("-1", "Martin", "Léa", "TG1"),
            student("-2", "Durand", "Hugo", "1S2"),
            student("-3", "Petit", "Martine", "TG2"),
        ])
    }

    fn ids(roster: &Roster, filter: &str) -> Vec<String> {
        roster
            .view(&Filter::new(filter))
            .rows
            .into_iter()
            .map(|row| row.student.id.to_string())
            .collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let roster = Roster::new(vec![Student {
            id: student::Id::new("-0").unwrap(),
            ..Student::default()
        }]);

        assert_eq!(roster.view(&Filter::default()).rows.len(), 1);
    }

    #[test]
    fn filters_case_insensitively_on_names_and_class() {
        let roster = roster();

        assert_eq!(ids(&roster, ""), ["-1", "-2", "-3"]);
        assert_eq!(ids(&roster, "MART"), ["-1", "-3"]);
        assert_eq!(ids(&roster, "hugo"), ["-2"]);
        assert_eq!(ids(&roster, "tg"), ["-1", "-3"]);
        assert_eq!(ids(&roster, "léa"), ["-1"]);
        assert!(ids(&roster, "zzz").is_empty());
    }

    #[test]
    fn totals_cover_filtered_rows() {
        let roster = roster();

        let all = roster.view(&Filter::default()).totals;
        assert_eq!(all.count, 3);
        assert_eq!(all.total, Money::from_cents(52_50));
        assert_eq!(all.savings, Money::from_cents(16_65));

        let some = roster.view(&Filter::new("tg")).totals;
        assert_eq!(some.count, 2);
        assert_eq!(some.total, Money::from_cents(35_00));
        assert_eq!(some.savings, Money::from_cents(11_10));

        let none = roster.view(&Filter::new("zzz")).totals;
        assert_eq!(none.count, 0);
        assert_eq!(none.total, Money::ZERO);
    }

    #[test]
    fn looks_up_rows_by_id() {
        let roster = roster();

        let row = roster.get(&student::Id::new("-2").unwrap()).unwrap();
        assert_eq!(row.student.last_name, "Durand");
        assert_eq!(row.bill.net, Money::from_cents(11_95));
        assert!(roster.get(&student::Id::new("-9").unwrap()).is_none());
    }
}
