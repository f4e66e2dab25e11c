use crate::types::Subscription;

/// Fragments GitHub uses when a resource is hidden from the current token
const PRIVATE_HINTS: [&str; 3] = ["not found", "not exist", "permission"];

/// Best-effort guess that a fetch failed because the resource is private.
///
/// This is a plain substring match on the error text, not a permission check.
pub fn maybe_private(error_message: Option<&str>) -> bool {
    let message = error_message.unwrap_or_default().to_lowercase();
    PRIVATE_HINTS.iter().any(|hint| message.contains(hint))
}

/// Username to probe for a possibly private subscription, `None` disables the probe
pub fn probe_username(subscription: Option<&Subscription>) -> Option<&str> {
    let subscription = subscription?;
    if !maybe_private(subscription.data.error_message.as_deref()) {
        return None;
    }
    subscription.params.owner_or_org()
}
