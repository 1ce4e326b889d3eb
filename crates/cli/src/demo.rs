//! The demo reply service exposed by the `qi` binary.

use corelib::{Tuple, Value};
use dispatch::{LocalBroadcaster, MethodBuilder, Object};
use std::sync::Arc;

pub const SERVICE_NAME: &str = "serviceTest";

fn reply(args: &Tuple) -> anyhow::Result<Vec<Value>> {
    let message: String = args.get(0)?;
    Ok(vec![Value::String(format!("{}bim", message))])
}

fn answer(_: &Tuple) -> anyhow::Result<Vec<Value>> {
    Ok(vec![Value::String("42!".to_string())])
}

fn add(args: &Tuple) -> anyhow::Result<Vec<Value>> {
    let (a, b, c) = (args.get::<i32>(0)?, args.get::<i32>(1)?, args.get::<i32>(2)?);
    let sum = a
        .checked_add(b)
        .and_then(|ab| ab.checked_add(c))
        .ok_or_else(|| anyhow::anyhow!("{} + {} + {} overflows", a, b, c))?;
    Ok(vec![Value::Int32(sum)])
}

fn info(args: &Tuple) -> anyhow::Result<Vec<Value>> {
    (0..args.arity())
        .map(|index| -> anyhow::Result<Value> { Ok(args.get_value(index)?.clone()) })
        .collect()
}

/// Build the demo service. Its `fire` signal is delivered through
/// `broadcaster`.
pub fn reply_service(broadcaster: Arc<LocalBroadcaster>) -> dispatch::Result<Object> {
    let object = Object::with_broadcaster(broadcaster);

    object.advertise_signal(
        MethodBuilder::new("fire::(i)")
            .description("Raised on request")
            .param("value", "payload"),
    )?;
    object.advertise_method(
        MethodBuilder::new("reply::s(s)")
            .description("Echo a message with a suffix")
            .param("message", "text to echo")
            .returns("the message followed by \"bim\""),
        reply,
    )?;
    object.advertise_method(
        MethodBuilder::new("answer::s()").returns("the answer"),
        answer,
    )?;
    object.advertise_method(
        MethodBuilder::new("add::i(iii)")
            .description("Sum three integers")
            .param("a", "first term")
            .param("b", "second term")
            .param("c", "third term")
            .returns("a + b + c"),
        add,
    )?;
    object.advertise_method(
        MethodBuilder::new("info::(sib)(sib)").description("Return the arguments unchanged"),
        info,
    )?;

    Ok(object)
}
