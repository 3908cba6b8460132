//! Name registry wrapper.
//!
//! Names are 32-byte keys: UTF-8 bytes left-aligned and zero-padded.

use alloy_primitives::{Address, FixedBytes};
use alloy_sol_types::sol;

use crate::contracts::{names, read_call, send_call, ContractRegistry};
use crate::error::{ContractError, Result};
use crate::rpc::client::NodeClient;
use crate::rpc::transport::Transport;
use crate::rpc::tx::PendingTx;

sol! {
    function reserve(bytes32 name) external;
    function owner(bytes32 name) external view returns (address);
    function addr(bytes32 name) external view returns (address);
    function name(address account) external view returns (bytes32);
    function setAddress(bytes32 name, address to, bool primary) external;
    function transfer(bytes32 name, address to) external;
    function disown(bytes32 name) external;
}

/// Encode a registry name as its 32-byte key.
fn name_key(name: &str) -> std::result::Result<FixedBytes<32>, ContractError> {
    let bytes = name.as_bytes();
    if bytes.len() > 32 {
        return Err(ContractError::NameTooLong { name: name.into() });
    }
    let mut key = [0u8; 32];
    key[..bytes.len()].copy_from_slice(bytes);
    Ok(FixedBytes(key))
}

/// Decode a 32-byte key back into a registry name.
fn key_name(key: FixedBytes<32>) -> String {
    let end = key.iter().position(|b| *b == 0).unwrap_or(32);
    String::from_utf8_lossy(&key[..end]).into_owned()
}

/// Wrapper for the name registry contract.
pub struct Namereg<'a, T: Transport> {
    client: &'a NodeClient<T>,
    address: Address,
    from: Address,
}

impl<'a, T: Transport> Namereg<'a, T> {
    /// Resolve the registry address and bind the sending account.
    pub fn new(
        client: &'a NodeClient<T>,
        registry: &ContractRegistry,
        from: Address,
    ) -> std::result::Result<Self, ContractError> {
        Ok(Self {
            client,
            address: registry.address(names::NAMEREG)?,
            from,
        })
    }

    /// Reserve `name` for the sending account.
    pub async fn reserve(&self, name: &str) -> Result<PendingTx<'a, T>> {
        let call = reserveCall {
            name: name_key(name)?,
        };
        send_call(self.client, self.from, self.address, call).await
    }

    /// Account that owns `name`.
    pub async fn owner(&self, name: &str) -> Result<Address> {
        let call = ownerCall {
            name: name_key(name)?,
        };
        read_call(self.client, self.from, self.address, call).await
    }

    /// Address `name` currently resolves to.
    pub async fn addr(&self, name: &str) -> Result<Address> {
        let call = addrCall {
            name: name_key(name)?,
        };
        read_call(self.client, self.from, self.address, call).await
    }

    /// Primary name registered for `account`.
    pub async fn name(&self, account: Address) -> Result<String> {
        let call = nameCall { account };
        let key = read_call(self.client, self.from, self.address, call).await?;
        Ok(key_name(key))
    }

    /// Point `name` at `to`; `primary` also makes it the reverse record.
    pub async fn set_address(
        &self,
        name: &str,
        to: Address,
        primary: bool,
    ) -> Result<PendingTx<'a, T>> {
        let call = setAddressCall {
            name: name_key(name)?,
            to,
            primary,
        };
        send_call(self.client, self.from, self.address, call).await
    }

    /// Hand ownership of `name` to `to`.
    pub async fn transfer(&self, name: &str, to: Address) -> Result<PendingTx<'a, T>> {
        let call = transferCall {
            name: name_key(name)?,
            to,
        };
        send_call(self.client, self.from, self.address, call).await
    }

    /// Release ownership of `name`.
    pub async fn disown(&self, name: &str) -> Result<PendingTx<'a, T>> {
        let call = disownCall {
            name: name_key(name)?,
        };
        send_call(self.client, self.from, self.address, call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_key_left_aligns_and_pads() {
        let key = name_key("jack").unwrap();
        assert_eq!(&key[..4], b"jack");
        assert!(key[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn name_key_rejects_long_names() {
        let long = "x".repeat(33);
        assert!(matches!(
            name_key(&long),
            Err(ContractError::NameTooLong { .. })
        ));
    }

    #[test]
    fn key_name_round_trips() {
        assert_eq!(key_name(name_key("tinybike").unwrap()), "tinybike");
        assert_eq!(key_name(name_key("").unwrap()), "");
    }
}
