//! Fixed portal constants: endpoint URLs, form selectors, the jurisdiction
//! table and the default keyword corpus. The selector strings target the
//! portal's server-rendered markup and change only when the site layout does.

use crate::types::Jurisdiction;

// Portal endpoints
pub const SEARCH_URL: &str = "https://www.handelsregisterbekanntmachungen.de/?aktion=suche";
pub const DETAIL_BASE_URL: &str = "https://www.handelsregisterbekanntmachungen.de/skripte/hrb.php";

// Listing links are script-call wrappers around the announcement id
pub const LINK_PREFIX: &str = "javascript:NeuFenster('";
pub const LINK_SUFFIX: &str = "')";

// Search form
pub const JURISDICTION_DROPDOWN: &str = r#"select[name="land"]"#;
pub const SUBJECT_DROPDOWN: &str = r#"select[name="gegenstand"]"#;
pub const SUBJECT_FILTER_VALUE: &str = "1";
pub const KEYWORD_INPUT: &str = r#"input[name="fname"]"#;
pub const SUBMIT_BUTTON: &str = r#"input[type="submit"]"#;
pub const LISTING_LINKS: &str = "#inhalt > b > li > a";

// Detail page cells, fixed positions in the announcement table
pub const COURT_INFO_CELL: &str =
    "body > p > font > table > tbody > tr:nth-child(1) > td:nth-child(1) > nobr";
pub const PUBLICATION_INFO_CELL: &str =
    "body > p > font > table > tbody > tr:nth-child(1) > td:nth-child(2)";
pub const REGISTRATION_DATE_CELL: &str = "body > p > font > table > tbody > tr:nth-child(4)";
pub const REGISTRATION_DETAILS_CELL: &str = "body > p > font > table > tbody > tr:nth-child(6)";

/// The 16 Bundesländer the portal's `land` dropdown accepts. Never created
/// or destroyed at runtime.
pub const JURISDICTIONS: [Jurisdiction; 16] = [
    Jurisdiction { name: "Baden-Wuerttemberg", code: "bw" },
    Jurisdiction { name: "Bayern", code: "by" },
    Jurisdiction { name: "Berlin", code: "be" },
    Jurisdiction { name: "Brandenburg", code: "br" },
    Jurisdiction { name: "Bremen", code: "hb" },
    Jurisdiction { name: "Hamburg", code: "hh" },
    Jurisdiction { name: "Hessen", code: "he" },
    Jurisdiction { name: "Mecklenburg-Vorpommern", code: "mv" },
    Jurisdiction { name: "Niedersachsen", code: "ni" },
    Jurisdiction { name: "Nordrhein-Westfalen", code: "nw" },
    Jurisdiction { name: "Rheinland-Pfalz", code: "rp" },
    Jurisdiction { name: "Saarland", code: "sl" },
    Jurisdiction { name: "Sachsen", code: "sn" },
    Jurisdiction { name: "Sachsen-Anhalt", code: "st" },
    Jurisdiction { name: "Schleswig-Holstein", code: "sh" },
    Jurisdiction { name: "Thüringen", code: "th" },
];

/// Default gastronomy keyword corpus, overridable via `config.toml`.
pub const DEFAULT_KEYWORDS: [&str; 15] = [
    "gastro",
    "gastronomie",
    "restaurant",
    "food",
    "bar",
    "cafe",
    "diner",
    "pizza",
    "pizzaria",
    "wirtshaus",
    "gasthaus",
    "coffee",
    "kaffee",
    "brunch",
    "catering",
];

// Ledger defaults
pub const DEFAULT_LEDGER_TABLE: &str = "handelregisterDaten";
pub const DEFAULT_ID_COLUMN_RANGE: &str = "B:B";
pub const DEFAULT_TOKEN_ENV: &str = "HRB_SHEETS_TOKEN";

// Pacing defaults, milliseconds
pub const DEFAULT_PACING_MIN_MS: u64 = 1000;
pub const DEFAULT_PACING_MAX_MS: u64 = 4000;
