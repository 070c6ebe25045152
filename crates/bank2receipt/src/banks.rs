//! Israeli bank codes, as they appear in the bank column of an export.

pub const UNKNOWN_BANK: &str = "unknown";

const BANKS: &[(u16, &str)] = &[
    (4, "בנק יהב"),
    (6, "בנק אדנים למשכנתאות"),
    (9, "בנק הדואר"),
    (10, "בנק לאומי"),
    (11, "בנק דיסקונט"),
    (12, "בנק הפועלים"),
    (13, "בנק איגוד"),
    (14, "בנק אוצר החייל"),
    (17, "בנק מרכנתיל דיסקונט"),
    (20, "בנק מזרחי טפחות"),
    (22, "בנק CitiBank"),
    (23, "בנק HSBC"),
    (25, "בנק BNP Paribas"),
    (26, "בנק יובנק"),
    (27, "Barclays Bank PLC"),
    (31, "בנק הבינלאומי"),
    (34, "בנק ערבי ישראלי"),
    (39, "בנק SBI State of India"),
    (43, "ג'ורדן נשיונל בנק PLC.עמאן"),
    (46, "בנק מסד"),
    (48, "בנק קופת העובד הלאומי"),
    (50, "מרכז סליקה בנקאי (מס\"ב)"),
    (52, "בנק פועלי אגודת ישראל"),
    (54, "בנק ירושלים"),
    (59, "שב\"א"),
    (65, "חסך קופת חסכון לחינוך"),
    (66, "אל-אהלי"),
    (67, "בנק Arab Land"),
    (68, "בנק דקסיה"),
    (71, "קומרשייל ג'ורדן"),
    (73, "בנק איסלאמי"),
    (74, "בריטיש בנק אוף מידל איסט"),
    (76, "פלסטין להשקעה"),
    (77, "בנק לאומי למשכנתאות"),
    (82, "אל-קודס לפיתוח והשקעות"),
    (83, "יוניון בנק"),
    (84, "אלאסכאן"),
    (89, "בנק קהיר עמאן"),
    (90, "בנק דיסקונט למשכנתאות"),
    (93, "ג'ורדן כוויית"),
    (99, "בנק ישראל"),
];

/// Display name of a bank, or [`UNKNOWN_BANK`].
pub fn bank_name(code: u16) -> &'static str {
    BANKS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(UNKNOWN_BANK, |(_, name)| *name)
}
