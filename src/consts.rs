/// Largest year accepted by the ISO text form (four digits)
pub const MAX_YEAR: i32 = 9999;

/// Smallest year accepted by the ISO text form
pub const MIN_YEAR: i32 = 1;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// First day of month, used for lower bounds
pub const MIN_DAY: u8 = 1;

/// Number of days in a calendar week
pub const DAYS_IN_WEEK: u8 = 7;

/// Largest valid week-start offset (0 is Sunday, 6 is Saturday)
pub const MAX_WEEK_START: u8 = DAYS_IN_WEEK - 1;

/// Months in a year, used for month-index arithmetic
pub const MONTHS_IN_YEAR: i64 = 12;

/// Date component separator (ISO 8601 format)
pub const DATE_SEPARATOR: char = '-';

/// strftime pattern of the ISO text form
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Visible month count above which a freshly opened view is shifted around today
pub const RECENTER_MONTH_THRESHOLD: u16 = 2;
