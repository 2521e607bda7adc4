//! Twilio webhook field vocabulary: the closed set of form keys an inbound SMS payload may carry.

/// A recognized webhook field. The discriminant is the field's slot in [`super::InboundMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ToCountry,
    ToState,
    SmsMessageSid,
    NumMedia,
    ToCity,
    FromZip,
    SmsSid,
    FromState,
    SmsStatus,
    FromCity,
    Body,
    FromCountry,
    /// The destination number (`To` on the wire).
    To,
    ToZip,
    NumSegments,
    MessageSid,
    AccountSid,
    From,
    ApiVersion,
}

/// Number of slots an inbound message holds.
pub const FIELD_COUNT: usize = FIELDS.len();

/// Wire name -> field. Order matches the enum so `FIELDS[f.slot()].1 == f`.
pub const FIELDS: [(&str, Field); 19] = [
    ("ToCountry", Field::ToCountry),
    ("ToState", Field::ToState),
    ("SmsMessageSid", Field::SmsMessageSid),
    ("NumMedia", Field::NumMedia),
    ("ToCity", Field::ToCity),
    ("FromZip", Field::FromZip),
    ("SmsSid", Field::SmsSid),
    ("FromState", Field::FromState),
    ("SmsStatus", Field::SmsStatus),
    ("FromCity", Field::FromCity),
    ("Body", Field::Body),
    ("FromCountry", Field::FromCountry),
    ("To", Field::To),
    ("ToZip", Field::ToZip),
    ("NumSegments", Field::NumSegments),
    ("MessageSid", Field::MessageSid),
    ("AccountSid", Field::AccountSid),
    ("From", Field::From),
    ("ApiVersion", Field::ApiVersion),
];

impl Field {
    /// Look up a field by its exact (case-sensitive) wire name.
    pub fn from_name(name: &str) -> Option<Field> {
        FIELDS.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    /// Wire name, e.g. "SmsMessageSid".
    pub fn name(self) -> &'static str {
        FIELDS[self.slot()].0
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}
