//! Transaction envelope, routing and per-transaction results.

use serde::{Deserialize, Serialize};
use simplegov_governance::GovMsg;
use simplegov_types::Address;

use crate::bank::SendMsg;
use crate::error::AppError;
use crate::stake::{BondMsg, UnbondMsg};

/// Every message the application routes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMsg {
    Send(SendMsg),
    Bond(BondMsg),
    Unbond(UnbondMsg),
    Gov(GovMsg),
}

impl AppMsg {
    /// `module/kind` route used in logs and results.
    pub fn route(&self) -> String {
        match self {
            Self::Send(_) => "bank/send".to_string(),
            Self::Bond(_) => "stake/bond".to_string(),
            Self::Unbond(_) => "stake/unbond".to_string(),
            Self::Gov(msg) => format!("gov/{}", msg.kind()),
        }
    }

    /// Addresses that must have signed a transaction carrying this message.
    pub fn signers(&self) -> Vec<Address> {
        match self {
            Self::Send(msg) => msg.signers(),
            Self::Bond(msg) => vec![msg.address.clone()],
            Self::Unbond(msg) => vec![msg.address.clone()],
            Self::Gov(msg) => msg.signers(),
        }
    }
}

/// An authenticated transaction: signature checking happens upstream, so the
/// envelope carries the addresses whose signatures were verified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub signers: Vec<Address>,
    pub msg: AppMsg,
}

impl Tx {
    /// Wrap `msg` signed by exactly its required signers.
    pub fn signed(msg: AppMsg) -> Self {
        Self {
            signers: msg.signers(),
            msg,
        }
    }

    /// The signer set must equal the message's required signers.
    pub fn check_signers(&self) -> Result<(), AppError> {
        let mut required = self.msg.signers();
        let mut given = self.signers.clone();
        required.sort();
        given.sort();
        if required != given {
            return Err(AppError::Unauthorized(format!(
                "{} requires signers [{}], got [{}]",
                self.msg.route(),
                join(&required),
                join(&given)
            )));
        }
        Ok(())
    }
}

fn join(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of delivering one transaction. `code == 0` means success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    pub code: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub codespace: String,
    pub log: String,
}

impl TxResult {
    pub fn ok(log: impl Into<String>) -> Self {
        Self {
            code: 0,
            codespace: String::new(),
            log: log.into(),
        }
    }

    pub fn from_error(e: &AppError) -> Self {
        Self {
            code: e.code(),
            codespace: e.codespace().to_string(),
            log: e.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplegov_governance::VoteMsg;
    use simplegov_types::Coins;

    fn vote_tx(signers: &[&str]) -> Tx {
        Tx {
            signers: signers.iter().map(|s| Address::new(*s)).collect(),
            msg: AppMsg::Gov(GovMsg::Vote(VoteMsg::new(1, "Yes", Address::new("bob")))),
        }
    }

    #[test]
    fn signer_set_must_match_exactly() {
        vote_tx(&["bob"]).check_signers().unwrap();
        for signers in [&[][..], &["alice"][..], &["bob", "alice"][..]] {
            assert!(matches!(
                vote_tx(signers).check_signers(),
                Err(AppError::Unauthorized(_))
            ));
        }
    }

    #[test]
    fn routes_name_module_and_kind() {
        assert_eq!(vote_tx(&["bob"]).msg.route(), "gov/vote");
        let send = AppMsg::Send(SendMsg {
            from: Address::new("a"),
            to: Address::new("b"),
            amount: Coins::single("coin", 1),
        });
        assert_eq!(send.route(), "bank/send");
    }

    #[test]
    fn json_shape() {
        let json = r#"{
            "signers": ["bob"],
            "msg": {"gov": {"type": "vote", "proposal_id": 1, "option": "Yes", "voter": "bob"}}
        }"#;
        let tx: Tx = serde_json::from_str(json).unwrap();
        assert_eq!(tx, vote_tx(&["bob"]));
    }

    #[test]
    fn error_results_carry_code_and_codespace() {
        let result = TxResult::from_error(&AppError::Unauthorized("x".into()));
        assert!(!result.is_ok());
        assert_eq!((result.code, result.codespace.as_str()), (1, "app"));
        assert!(TxResult::ok("done").is_ok());
    }
}
