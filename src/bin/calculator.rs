//! Two calculator agents wired over an in-process channel pair.
//!
//! Walks every call outcome — success, unknown operation, invalid arguments,
//! application failure — and finishes with a burst of concurrent calls.
//! Run with `RUST_LOG=debug` to watch the dispatch decisions.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use caplink::channel::local;
use caplink::operation::handler;
use caplink::{Agent, AgentType, ApplicationFailure, CapabilityDescriptor};

/// Fill a parameter from its positional slot, falling back to a keyword.
fn param(name: &str, index: usize, args: &[Value], kwargs: &HashMap<String, Value>) -> Value {
    args.get(index)
        .or_else(|| kwargs.get(name))
        .cloned()
        .unwrap_or(Value::Null)
}

fn calculator() -> Result<AgentType, caplink::ConfigError> {
    AgentType::builder("Calculator")
        .expose(
            "add",
            CapabilityDescriptor::positional(2).with_keywords(["x", "y"]),
            handler(|args, kwargs| {
                let x = param("x", 0, args, kwargs);
                let y = param("y", 1, args, kwargs);
                Ok(json!(x.as_i64().unwrap_or(0) + y.as_i64().unwrap_or(0)))
            }),
        )
        .expose(
            "divide",
            CapabilityDescriptor::positional(2).with_keywords(["x", "y"]),
            handler(|args, kwargs| {
                let x = param("x", 0, args, kwargs);
                let y = param("y", 1, args, kwargs);
                if y.as_f64() == Some(0.0) {
                    return Err(ApplicationFailure::new(vec![x, y]).into());
                }
                Ok(json!(x.as_f64().unwrap_or(0.0) / y.as_f64().unwrap_or(1.0)))
            }),
        )
        .build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let calculator_type = Arc::new(calculator()?);
    println!(
        "agent type {:?} exposes {:?}",
        calculator_type.name(),
        calculator_type.capability_names()
    );

    let (left, right) = local::pair();
    let caller = Agent::new(calculator_type.clone());
    let callee = Agent::new(calculator_type);
    caller.bind(left)?;
    callee.bind(right)?;

    println!(
        "add(2, 3)              -> {:?}",
        caller
            .call_positional("add", vec![json!(2), json!(3)])
            .await
    );
    println!(
        "add(2, y=3)            -> {:?}",
        caller
            .call(
                "add",
                vec![json!(2)],
                HashMap::from([("y".to_string(), json!(3))]),
            )
            .await
    );
    println!(
        "add(2)                 -> {:?}",
        caller.call_positional("add", vec![json!(2)]).await
    );
    println!(
        "add(2, 3, 4)           -> {:?}",
        caller
            .call_positional("add", vec![json!(2), json!(3), json!(4)])
            .await
    );
    println!(
        "add(2, y=3, z=9)       -> {:?}",
        caller
            .call(
                "add",
                vec![json!(2)],
                HashMap::from([
                    ("y".to_string(), json!(3)),
                    ("z".to_string(), json!(9)),
                ]),
            )
            .await
    );
    println!(
        "subtract(2, 3)         -> {:?}",
        caller
            .call_positional("subtract", vec![json!(2), json!(3)])
            .await
    );
    println!(
        "divide(4, 0)           -> {:?}",
        caller
            .call_positional("divide", vec![json!(4), json!(0)])
            .await
    );

    let divide = caller.remote("divide");
    println!(
        "remote divide(9, 3)    -> {:?}",
        divide.invoke(vec![json!(9), json!(3)], HashMap::new()).await
    );

    let burst = (1..=8i64).map(|i| {
        let caller = caller.clone();
        async move {
            caller
                .call_positional("divide", vec![json!(i * 10), json!(i)])
                .await
        }
    });
    let results = futures::future::join_all(burst).await;
    println!("8 concurrent divides   -> {:?}", results);

    Ok(())
}
