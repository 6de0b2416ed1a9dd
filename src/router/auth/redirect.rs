use url::Url;

/// Resolves the caller supplied `next` destination against the site origin.
///
/// Anything that does not parse, or lands on another origin, falls back to the site root.
pub(crate) fn resolve(origin: &Url, next: Option<&str>) -> Url {
    let next = next.unwrap_or("/");
    match origin.join(next) {
        Ok(target) if target.origin() == origin.origin() => target,
        Ok(target) => {
            tracing::warn!(message = "rejecting cross origin redirect target", target = %target);
            origin.clone()
        }
        Err(err) => {
            tracing::debug!(message = "unable to parse redirect target", next = %next, error = %err);
            origin.clone()
        }
    }
}
