//! Helpers for reading JSON-Cadence event payloads

use serde_json::Value;

use crate::transaction::{TransactionEvent, TransactionResult};
use super::constants::{FlowContracts, ACCOUNT_CREATED_EVENT};

/// Raw value of field `name` of a JSON-Cadence event
pub fn event_field<'a>(event: &'a TransactionEvent, name: &str) -> Option<&'a Value> {
    event.data["value"]["fields"]
        .as_array()?
        .iter()
        .find(|field| field["name"] == name)
        .map(|field| &field["value"]["value"])
}

/// Token ids minted by the NFT contract
pub fn minted_token_ids(result: &TransactionResult, contracts: &FlowContracts) -> Vec<String> {
    let minted = contracts.minted_event();
    result
        .events
        .iter()
        .filter(|event| event.event_type == minted)
        .filter_map(|event| event_field(event, "id")?.as_str().map(str::to_string))
        .collect()
}

/// Address of the account created by the transaction
pub fn created_account_address(result: &TransactionResult) -> Option<String> {
    result
        .events
        .iter()
        .find(|event| event.event_type == ACCOUNT_CREATED_EVENT)
        .and_then(|event| event_field(event, "address")?.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: &str, name: &str, kind: &str, value: &str) -> TransactionEvent {
        TransactionEvent {
            event_type: event_type.to_string(),
            data: json!({
                "type": "Event",
                "value": {
                    "id": event_type,
                    "fields": [{ "name": name, "value": { "type": kind, "value": value } }]
                }
            }),
        }
    }

    #[test]
    fn test_minted_token_ids() {
        let contracts = FlowContracts::TESTNET;
        let mut result = TransactionResult::new("abc");
        result.events = vec![
            event(&contracts.minted_event(), "id", "UInt64", "17"),
            event("A.1.Other.Minted", "id", "UInt64", "99"),
        ];
        assert_eq!(minted_token_ids(&result, &contracts), vec!["17".to_string()]);
    }

    #[test]
    fn test_created_account_address() {
        let mut result = TransactionResult::new("abc");
        assert_eq!(created_account_address(&result), None);

        result.events = vec![event(ACCOUNT_CREATED_EVENT, "address", "Address", "0x01cf0e2f2f715450")];
        assert_eq!(
            created_account_address(&result).as_deref(),
            Some("0x01cf0e2f2f715450")
        );
    }
}
