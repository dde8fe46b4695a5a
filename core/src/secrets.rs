//! Long-term identity key management.
//!
//! The node's networking keypair lives in an external secrets manager under
//! the [`NETWORK_KEY`] name, hex-encoded. It is read back on every start and
//! generated exactly once on first boot.
use color_eyre::{eyre::WrapErr, Result};
use libp2p::identity::{ed25519, Keypair};
use mockall::automock;

/// Well-known secret name for the node's networking private key.
pub const NETWORK_KEY: &str = "network-key";

/// External store for the node's long-term secrets.
#[automock]
pub trait SecretsManager: Send + Sync {
	fn has(&self, name: &str) -> bool;

	fn get(&self, name: &str) -> Result<Vec<u8>>;

	fn set(&self, name: &str, value: Vec<u8>) -> Result<()>;
}

/// Loads the networking key from the secrets manager, generating and
/// persisting a fresh one if none is stored yet.
pub fn setup_network_key(secrets_manager: &dyn SecretsManager) -> Result<Keypair> {
	if secrets_manager.has(NETWORK_KEY) {
		return read_network_key(secrets_manager)
			.wrap_err("unable to read networking private key from secrets manager");
	}

	let (keypair, encoded) = generate_and_encode_network_key()
		.wrap_err("unable to generate networking private key")?;

	secrets_manager
		.set(NETWORK_KEY, encoded)
		.wrap_err("unable to store networking private key to secrets manager")?;

	Ok(keypair)
}

/// Reads and decodes the stored networking key.
pub fn read_network_key(secrets_manager: &dyn SecretsManager) -> Result<Keypair> {
	let encoded = secrets_manager.get(NETWORK_KEY)?;
	decode_network_key(&encoded)
}

/// Generates an ed25519 networking keypair together with its encoded form.
pub fn generate_and_encode_network_key() -> Result<(Keypair, Vec<u8>)> {
	let keypair = Keypair::generate_ed25519();
	let encoded = encode_network_key(&keypair)?;
	Ok((keypair, encoded))
}

pub fn encode_network_key(keypair: &Keypair) -> Result<Vec<u8>> {
	let keypair = keypair.clone().try_into_ed25519()?;
	Ok(hex::encode(keypair.to_bytes()).into_bytes())
}

pub fn decode_network_key(encoded: &[u8]) -> Result<Keypair> {
	let mut bytes = hex::decode(encoded).wrap_err("error decoding networking key")?;
	let keypair =
		ed25519::Keypair::try_from_bytes(&mut bytes).wrap_err("error importing networking key")?;
	Ok(keypair.into())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::sync::Mutex;

	#[derive(Default)]
	struct InMemorySecretsManager(Mutex<HashMap<String, Vec<u8>>>);

	impl SecretsManager for InMemorySecretsManager {
		fn has(&self, name: &str) -> bool {
			self.0.lock().unwrap().contains_key(name)
		}

		fn get(&self, name: &str) -> Result<Vec<u8>> {
			self.0
				.lock()
				.unwrap()
				.get(name)
				.cloned()
				.ok_or_else(|| color_eyre::eyre::eyre!("secret not found: {name}"))
		}

		fn set(&self, name: &str, value: Vec<u8>) -> Result<()> {
			self.0.lock().unwrap().insert(name.to_string(), value);
			Ok(())
		}
	}

	#[test]
	fn key_round_trip_is_byte_identical() {
		let (keypair, encoded) = generate_and_encode_network_key().unwrap();
		let decoded = decode_network_key(&encoded).unwrap();

		let original = keypair.try_into_ed25519().unwrap().to_bytes();
		let restored = decoded.try_into_ed25519().unwrap().to_bytes();
		assert_eq!(original, restored);
	}

	#[test]
	fn setup_generates_once_and_reads_back() {
		let secrets = InMemorySecretsManager::default();
		assert!(!secrets.has(NETWORK_KEY));

		let generated = setup_network_key(&secrets).unwrap();
		assert!(secrets.has(NETWORK_KEY));

		let reloaded = setup_network_key(&secrets).unwrap();
		assert_eq!(generated.public(), reloaded.public());
	}

	#[test]
	fn malformed_stored_key_is_rejected() {
		let secrets = InMemorySecretsManager::default();
		secrets.set(NETWORK_KEY, b"not hex".to_vec()).unwrap();
		assert!(setup_network_key(&secrets).is_err());
	}
}
