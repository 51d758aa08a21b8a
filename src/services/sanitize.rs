// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Note sanitization.

/// Strip scripts, event handlers and other unsafe markup from a user note.
///
/// Empty input, or input that sanitizes down to nothing, becomes `None`.
pub fn sanitize_note(dirty: Option<&str>) -> Option<String> {
    let dirty = dirty?.trim();
    if dirty.is_empty() {
        return None;
    }

    let cleaned = ammonia::clean(dirty);
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
