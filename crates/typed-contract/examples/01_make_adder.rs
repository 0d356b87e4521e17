//! # Contracted Closures Example
//!
//! Wraps a factory declared as `makeAdder(x: Int) -> Callable[[Int], Int]`,
//! calls the adder it returns, and shows the contract rejecting bad input
//! at both levels.
//!
//! Run with: `RUST_LOG=typed_contract=debug cargo run --example 01_make_adder`

use tracing_subscriber::EnvFilter;
use typed_contract::{Callable, ContractConfig, ContractEngine, Signature, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ContractConfig::from_toml_str("auto_wrap_returned_callables = true")?;
    let engine = ContractEngine::new(config);

    let make_adder = engine.function(
        "makeAdder",
        Signature::new().param("x", "Int").returns("Callable[[Int], Int]"),
        |args| {
            let x = args[0].as_int().unwrap_or_default();
            Ok(Value::Callable(Callable::native(
                "adder",
                Signature::new().untyped("y"),
                move |args| Ok(Value::Int(x + args[0].as_int().unwrap_or_default())),
            )))
        },
    )?;

    let add_two = make_adder.call(&[Value::Int(2)])?;
    let Some(add_two) = add_two.as_callable() else {
        return Err("makeAdder did not return a callable".into());
    };

    println!("add_two(3) = {:?}", add_two.call(&[Value::Int(3)])?);

    if let Err(err) = add_two.call(&[Value::from("3")]) {
        println!("add_two(\"3\") rejected: {err}");
    }
    if let Err(err) = make_adder.call(&[Value::Float(2.5)]) {
        println!("makeAdder(2.5) rejected: {err}");
    }

    if let Some(contract) = add_two.contract() {
        for param in contract.params() {
            println!("  {}: {}", param.name, param.descriptor);
        }
        println!("  -> {}", contract.returns());
    }

    Ok(())
}
