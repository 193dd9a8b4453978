use super::identity::Identity;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    TokenTransfer,
    TokenApprove,
    TokenTransferFrom,
    ItemMint,
    ItemBurn,
    ItemApprove,
    ItemSetApprovalForAll,
    ItemTransferFrom,
    ItemSafeTransferFrom,
    BallotGiveRight,
    BallotVote,
    BallotDelegate,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::TokenTransfer => "token_transfer",
            Operation::TokenApprove => "token_approve",
            Operation::TokenTransferFrom => "token_transfer_from",
            Operation::ItemMint => "item_mint",
            Operation::ItemBurn => "item_burn",
            Operation::ItemApprove => "item_approve",
            Operation::ItemSetApprovalForAll => "item_set_approval_for_all",
            Operation::ItemTransferFrom => "item_transfer_from",
            Operation::ItemSafeTransferFrom => "item_safe_transfer_from",
            Operation::BallotGiveRight => "ballot_give_right",
            Operation::BallotVote => "ballot_vote",
            Operation::BallotDelegate => "ballot_delegate",
        }
    }
}

/// One mutation request against an engine.
///
/// `caller` is the already-authenticated identity issuing the request. The
/// meaning of the remaining columns depends on `op`:
///
/// | op                          | from  | to        | value        | data    |
/// |-----------------------------|-------|-----------|--------------|---------|
/// | `token_transfer`            |       | recipient | amount       |         |
/// | `token_approve`             |       | spender   | amount       |         |
/// | `token_transfer_from`       | owner | recipient | amount       |         |
/// | `item_mint`                 |       | owner     | item id      |         |
/// | `item_burn`                 |       |           | item id      |         |
/// | `item_approve`              |       | spender   | item id      |         |
/// | `item_set_approval_for_all` |       | operator  | 1 / 0        |         |
/// | `item_transfer_from`        | owner | recipient | item id      |         |
/// | `item_safe_transfer_from`   | owner | recipient | item id      | payload |
/// | `ballot_give_right`         |       | voter     |              |         |
/// | `ballot_vote`               |       |           | option index |         |
/// | `ballot_delegate`           |       | delegate  |              |         |
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Request {
    pub op: Operation,
    pub caller: Identity,
    pub from: Option<Identity>,
    pub to: Option<Identity>,
    pub value: Option<u64>,
    pub data: Option<String>,
}
