//! A toy credential-revocation registry.
//!
//! Issued credentials are accumulated; revocation deletes them.  Holders
//! fetch a fresh membership proof after every update and relying parties
//! check it against the published state only.

use rsa_accumulator::{
    hash_str_to_big_integer, Accumulator, AccumulatorParams, MembershipProof, PublicState,
    Result,
};
use std::sync::{Arc, Mutex};
use std::thread;

/// Serializes writers: the accumulator itself is single-writer.
struct Registry {
    state: Mutex<Accumulator>,
}

impl Registry {
    fn new(acc: Accumulator) -> Self {
        Self {
            state: Mutex::new(acc),
        }
    }

    fn update<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(Accumulator) -> Result<Accumulator>,
    {
        let mut guard = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let next = op(guard.clone())?;
        *guard = next;
        Ok(())
    }

    fn issue(&self, credential: &str) -> Result<()> {
        let element = hash_str_to_big_integer(credential);
        self.update(|acc| acc.add(element).map(|(acc, _)| acc))
    }

    fn revoke(&self, credential: &str) -> Result<()> {
        let element = hash_str_to_big_integer(credential);
        self.update(|acc| acc.delete(element).map(|(acc, _)| acc))
    }

    fn prove(&self, credential: &str) -> Result<MembershipProof> {
        let guard = self.state.lock().unwrap_or_else(|p| p.into_inner());
        guard.create_proof(&hash_str_to_big_integer(credential))
    }

    fn publish(&self) -> PublicState {
        let guard = self.state.lock().unwrap_or_else(|p| p.into_inner());
        guard.public_state()
    }
}

fn main() -> Result<()> {
    let acc = Accumulator::bootstrap(&AccumulatorParams::testing(), 11, 22, 33)?;
    let registry = Arc::new(Registry::new(acc));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || -> Result<()> {
                for i in 0..5 {
                    registry.issue(&format!("credential-{worker}-{i}"))?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        match handle.join() {
            Ok(result) => result?,
            Err(_) => {
                eprintln!("Issuer thread panicked.");
                std::process::exit(1);
            }
        }
    }

    let published = registry.publish();
    println!("Published state: {}", published.to_json()?);

    let proof = registry.prove("credential-2-3")?;
    println!(
        "credential-2-3 valid before revocation: {}",
        published.verify(&proof)
    );

    registry.revoke("credential-2-3")?;
    let republished = registry.publish();
    println!(
        "credential-2-3 valid after revocation: {}",
        republished.verify(&proof)
    );
    match registry.prove("credential-2-3") {
        Ok(_) => {
            eprintln!("Revoked credential still provable.");
            std::process::exit(1);
        }
        Err(err) => println!("Proof request refused: {err}"),
    }

    let survivor = registry.prove("credential-0-0")?;
    println!(
        "credential-0-0 still valid: {}",
        republished.verify(&survivor)
    );
    Ok(())
}
