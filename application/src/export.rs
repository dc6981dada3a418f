//! CSV export of a [`Roster`].

use std::fmt::Write as _;

use common::DateTime;
use service::read::{student::Row, Roster};

/// Header line of an exported CSV file.
pub const HEADER: &str = "Nom;Prénom;Classe;Forfait_Jours;Forfait_Montant;\
                          Location_Jours;Location_Montant;KeyCard;\
                          KeyCard_Montant;Total;Economie;Total_Reel";

/// Renders the whole [`Roster`] as a semicolon-separated CSV, prefixed with
/// a UTF-8 byte order mark.
///
/// Amounts have two decimal digits and a period as the decimal separator.
#[must_use]
pub fn render(roster: &Roster) -> String {
    let mut csv = format!("\u{feff}{HEADER}\n");
    for row in roster.rows() {
        write_row(&mut csv, row);
    }
    csv
}

/// Appends the provided [`Row`] as a CSV line.
fn write_row(csv: &mut String, row: &Row) {
    let Row { student, bill } = row;
    // Writing into a `String` never fails.
    _ = writeln!(
        csv,
        "{};{};{};{};{};{};{};{};{};{};{};{}",
        student.last_name,
        student.first_name,
        student.class,
        student.forfait_days,
        bill.forfait.to_plain(),
        student.rental_days,
        bill.rental.to_plain(),
        if student.keycards > 0 { "Oui" } else { "Non" },
        bill.keycard.to_plain(),
        bill.total.to_plain(),
        bill.savings.to_plain(),
        bill.net.to_plain(),
    );
}

/// Returns the name of the CSV file exported on the day of the provided
/// [`DateTime`].
#[must_use]
pub fn file_name(at: DateTime) -> String {
    format!("paiements_sortie_{}.csv", at.date())
}
