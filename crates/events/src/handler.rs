/// Execute an aggregate command deterministically (no IO).
///
/// Decides with `handle`, then applies every returned event in order. The
/// aggregate keeps its own version tracking inside `apply`. On error the
/// aggregate is left untouched.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: refdata_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
