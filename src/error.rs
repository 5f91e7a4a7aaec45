use uuid::Uuid;

/// Everything that can go wrong while building or composing a booster. Only
/// `UnknownSet` ever reaches a caller of `generate_booster`; the rest are
/// absorbed by falling back to the default booster.
#[derive(Debug, thiserror::Error)]
pub enum BoosterError {
    #[error("{0} does not exist")]
    UnknownSet(String),

    #[error("could not draw {wanted} distinct cards from a sheet of {available}")]
    SheetExhausted { wanted: usize, available: usize },

    #[error("malformed booster rule: {0}")]
    MalformedRule(String),

    #[error("colour balanced sheets need at least 5 cards, asked for {0}")]
    InvalidCount(usize),

    #[error("no positive weight to select from")]
    NoWeight,

    #[error("card {0} missing from catalog")]
    UnknownCard(Uuid),

    #[error("{0} doesn't match any card")]
    UnresolvableCardCode(String),
}

pub type Res<T> = Result<T, BoosterError>;
