//! Static code tables for the enumerations exchanged with the backend.
//!
//! The backend speaks in numeric codes (sport, gender, descriptive tags) and
//! ISO country strings. Each enumeration below is backed by one `const`
//! table that maps the wire code to an i18n key and its English / French
//! labels, so the translation boundary stays pure data.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Display language of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// Parse a language tag such as `"fr"` or `"en-GB"`. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(|c: char| c == '-' || c == '_').next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }
}

/// One row of a code table.
#[derive(Debug, Clone, Copy)]
pub struct CodeEntry {
    pub code: u8,
    pub key: &'static str,
    pub en: &'static str,
    pub fr: &'static str,
}

impl CodeEntry {
    pub fn label(&self, lang: Language) -> &'static str {
        match lang {
            Language::En => self.en,
            Language::Fr => self.fr,
        }
    }
}

/// Generates a fieldless enum whose discriminants index into a code table.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $table:ident {
            $( $variant:ident = $code:literal, $key:literal, $en:literal, $fr:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $variant, )+
        }

        pub const $table: &[CodeEntry] = &[
            $( CodeEntry { code: $code, key: $key, en: $en, fr: $fr }, )+
        ];

        impl $name {
            /// Every variant, in table order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            fn entry(self) -> &'static CodeEntry {
                &$table[self as usize]
            }

            /// Resolve a numeric wire code. Unknown codes yield `None`.
            pub fn from_code(code: u8) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.code() == code)
            }

            /// Numeric code sent to the backend.
            pub fn code(self) -> u8 {
                self.entry().code
            }

            /// Translation key used by the view layer.
            pub fn label_key(self) -> &'static str {
                self.entry().key
            }

            /// Display label in the given language.
            pub fn label(self, lang: Language) -> &'static str {
                self.entry().label(lang)
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u8(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = u8::deserialize(deserializer)?;
                Self::from_code(code).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} code {code}",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

code_enum! {
    /// Sport practised by a prodigy.
    Sport, SPORTS {
        Football = 1, "sport.football", "Football", "Football";
        Basketball = 2, "sport.basketball", "Basketball", "Basket-ball";
        Tennis = 3, "sport.tennis", "Tennis", "Tennis";
        Rugby = 4, "sport.rugby", "Rugby", "Rugby";
        Athletics = 5, "sport.athletics", "Athletics", "Athlétisme";
        Handball = 6, "sport.handball", "Handball", "Handball";
        Volleyball = 7, "sport.volleyball", "Volleyball", "Volley-ball";
        Swimming = 8, "sport.swimming", "Swimming", "Natation";
    }
}

code_enum! {
    /// Gender as recorded on a prodigy profile.
    Gender, GENDERS {
        Male = 1, "gender.male", "Male", "Homme";
        Female = 2, "gender.female", "Female", "Femme";
    }
}

code_enum! {
    /// Descriptive trait tags attached to a prodigy profile.
    TraitTag, TRAIT_TAGS {
        Speed = 1, "tag.speed", "Speed", "Vitesse";
        Endurance = 2, "tag.endurance", "Endurance", "Endurance";
        Technique = 3, "tag.technique", "Technique", "Technique";
        Vision = 4, "tag.vision", "Game vision", "Vision du jeu";
        Leadership = 5, "tag.leadership", "Leadership", "Leadership";
        Strength = 6, "tag.strength", "Strength", "Force";
        Agility = 7, "tag.agility", "Agility", "Agilité";
        Discipline = 8, "tag.discipline", "Discipline", "Discipline";
        Creativity = 9, "tag.creativity", "Creativity", "Créativité";
        Teamwork = 10, "tag.teamwork", "Teamwork", "Esprit d'équipe";
        Composure = 11, "tag.composure", "Composure", "Sang-froid";
        Versatility = 12, "tag.versatility", "Versatility", "Polyvalence";
    }
}

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

/// Country used when a record carries none.
pub const DEFAULT_COUNTRY: &str = "FR";

/// Supported ISO 3166-1 alpha-2 codes with English / French names.
pub const COUNTRIES: &[(&str, &str, &str)] = &[
    ("BE", "Belgium", "Belgique"),
    ("BR", "Brazil", "Brésil"),
    ("CA", "Canada", "Canada"),
    ("CH", "Switzerland", "Suisse"),
    ("CI", "Côte d'Ivoire", "Côte d'Ivoire"),
    ("CM", "Cameroon", "Cameroun"),
    ("DE", "Germany", "Allemagne"),
    ("DZ", "Algeria", "Algérie"),
    ("ES", "Spain", "Espagne"),
    ("FR", "France", "France"),
    ("GB", "United Kingdom", "Royaume-Uni"),
    ("IT", "Italy", "Italie"),
    ("MA", "Morocco", "Maroc"),
    ("NG", "Nigeria", "Nigeria"),
    ("PT", "Portugal", "Portugal"),
    ("SN", "Senegal", "Sénégal"),
    ("TN", "Tunisia", "Tunisie"),
    ("US", "United States", "États-Unis"),
];

/// Whether `code` is a supported country code (case-sensitive, upper-case).
pub fn is_known_country(code: &str) -> bool {
    COUNTRIES.iter().any(|(c, _, _)| *c == code)
}

/// Display name for a country code, or `None` when unsupported.
pub fn country_label(code: &str, lang: Language) -> Option<&'static str> {
    COUNTRIES
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, en, fr)| match lang {
            Language::En => *en,
            Language::Fr => *fr,
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
