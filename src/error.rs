use crate::domain::identity::Identity;
use crate::domain::registry::ItemId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssetError>;

/// Broad classes of failure, used by callers to decide how to present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    Precondition,
    Referential,
    Structural,
    Infrastructure,
}

#[derive(Error, Debug)]
pub enum AssetError {
    // Authorization
    #[error("{caller} is not the chairperson")]
    NotChairperson { caller: Identity },
    #[error("{claimed} is not the owner of item {item_id}")]
    NotOwner { claimed: Identity, item_id: ItemId },
    #[error("{caller} is not authorized to act on item {item_id}")]
    NotAuthorized { caller: Identity, item_id: ItemId },

    // State preconditions
    #[error("insufficient balance on {account}: available {available}, required {required}")]
    InsufficientBalance {
        account: Identity,
        available: u128,
        required: u128,
    },
    #[error(
        "insufficient allowance from {owner} to {spender}: remaining {remaining}, required {required}"
    )]
    InsufficientAllowance {
        owner: Identity,
        spender: Identity,
        remaining: u128,
        required: u128,
    },
    #[error("{voter} has already voted")]
    AlreadyVoted { voter: Identity },
    #[error("{voter} already has the right to vote")]
    AlreadyVoter { voter: Identity },
    #[error("item {item_id} is already minted")]
    AlreadyMinted { item_id: ItemId },
    #[error("{voter} has no right to vote")]
    NoRightToVote { voter: Identity },

    // Referential
    #[error("item {item_id} does not exist")]
    NonexistentItem { item_id: ItemId },
    #[error("the null identity cannot own items")]
    NullOwner,
    #[error("item {item_id} cannot be transferred to the null identity")]
    NullRecipient { item_id: ItemId },
    #[error("no votes have been cast yet")]
    NoVotesYet,

    // Structural / input
    #[error("{count} options given, at most {max} allowed")]
    TooManyOptions { count: usize, max: usize },
    #[error("option label {label:?} is {len} bytes long, at most {max} allowed")]
    NameTooLong {
        label: String,
        len: usize,
        max: usize,
    },
    #[error("{voter} cannot delegate to itself")]
    SelfDelegation { voter: Identity },
    #[error("delegation from {voter} to {target} loops back to {voter}")]
    DelegationLoop { voter: Identity, target: Identity },
    #[error("delegate {delegate} has no right to vote")]
    DelegateCannotVote { delegate: Identity },
    #[error("leading option has {votes} votes, more than half of {registered} voters required")]
    InsufficientMajority { votes: u64, registered: usize },
    #[error("{recipient} did not acknowledge item {item_id}: {reason}")]
    UnsafeRecipient {
        recipient: Identity,
        item_id: ItemId,
        reason: String,
    },
    #[error("option {index} does not exist, ballot has {count} options")]
    InvalidOption { index: usize, count: usize },

    #[error("request {op} is missing field `{field}`")]
    MissingField { op: &'static str, field: &'static str },
    #[error("value {value} is out of range for {field}")]
    OutOfRange { field: &'static str, value: u64 },

    // Infrastructure
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AssetError {
    pub fn kind(&self) -> ErrorKind {
        use AssetError::*;
        match self {
            NotChairperson { .. } | NotOwner { .. } | NotAuthorized { .. } => {
                ErrorKind::Authorization
            }
            InsufficientBalance { .. }
            | InsufficientAllowance { .. }
            | AlreadyVoted { .. }
            | AlreadyVoter { .. }
            | AlreadyMinted { .. }
            | NoRightToVote { .. } => ErrorKind::Precondition,
            NonexistentItem { .. } | NullOwner | NullRecipient { .. } | NoVotesYet => {
                ErrorKind::Referential
            }
            TooManyOptions { .. }
            | NameTooLong { .. }
            | SelfDelegation { .. }
            | DelegationLoop { .. }
            | DelegateCannotVote { .. }
            | InsufficientMajority { .. }
            | UnsafeRecipient { .. }
            | InvalidOption { .. }
            | MissingField { .. }
            | OutOfRange { .. } => ErrorKind::Structural,
            _ => ErrorKind::Infrastructure,
        }
    }
}
