use rsa_accumulator::{hash_str_to_big_integer, Accumulator, AccumulatorParams};

fn main() {
    let params = AccumulatorParams::testing();
    let acc = match Accumulator::bootstrap(&params, 1, 2, 3) {
        Ok(acc) => acc,
        Err(err) => {
            eprintln!("Bootstrap failed: {err}");
            std::process::exit(1);
        }
    };
    println!("Modulus: {} bits", acc.modulus().bits());

    let mut acc = acc;
    for name in ["alice", "bob", "carol"] {
        let element = hash_str_to_big_integer(name);
        acc = match acc.add(element) {
            Ok((next, _)) => next,
            Err(err) => {
                eprintln!("Adding {name} failed: {err}");
                std::process::exit(1);
            }
        };
    }

    let bob = hash_str_to_big_integer("bob");
    let proof = match acc.create_proof(&bob) {
        Ok(proof) => proof,
        Err(err) => {
            eprintln!("Proof creation failed: {err}");
            std::process::exit(1);
        }
    };
    let state = acc.public_state();
    if state.verify(&proof) {
        println!("Membership of bob verified against {} elements.", acc.len());
    } else {
        eprintln!("Membership verification failed.");
        std::process::exit(1);
    }

    let acc = match acc.delete(bob.clone()) {
        Ok((next, _)) => next,
        Err(err) => {
            eprintln!("Deleting bob failed: {err}");
            std::process::exit(1);
        }
    };
    if acc.public_state().verify(&proof) {
        eprintln!("Stale proof unexpectedly verified.");
        std::process::exit(1);
    }
    println!("bob removed; old proof no longer verifies.");
}
