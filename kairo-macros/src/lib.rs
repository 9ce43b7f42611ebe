//! Procedural macros for Kairo.
//!
//! - `#[derive(Message)]`: implement `Message` for an event type
//! - `#[subscriber]`: turn the `#[listener]` methods of an `impl` block into
//!   a `Subscriber` implementation
//! - `#[listener]`: mark a handler method inside a `#[subscriber]` block

use proc_macro::TokenStream;

mod message;
mod subscriber;

/// Derive macro for implementing `Message`.
///
/// Add `#[message(parallel)]` to dispatch the type on the worker pool.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Message)]
/// struct Login { user: u64 }
///
/// #[derive(Message)]
/// #[message(parallel)]
/// struct Reindex;
/// ```
#[proc_macro_derive(Message, attributes(message))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    message::derive_message_impl(input)
}

/// Implement `Subscriber` from the `#[listener]` methods of an `impl` block.
///
/// Each listener takes `&self` and a reference to the event type, and returns
/// `()` or a `Result`.
///
/// # Example
///
/// ```rust,ignore
/// #[subscriber]
/// impl Audit {
///     #[listener(priority = -10)]
///     fn on_login(&self, event: &Login) {
///         self.log.record(event.user);
///     }
///
///     #[listener]
///     fn on_logout(&self, event: &Logout) -> Result<(), AuditError> {
///         self.store.append(event)
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn subscriber(attr: TokenStream, item: TokenStream) -> TokenStream {
    subscriber::subscriber_impl(attr, item)
}

/// Mark a handler method. Only meaningful inside a `#[subscriber]` block.
///
/// Options: `priority = <i32>` (lower runs first, default 0) and
/// `parallel` (recorded on the handler, default false).
#[proc_macro_attribute]
pub fn listener(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = proc_macro2::TokenStream::from(item);
    syn::Error::new_spanned(
        &item,
        "#[listener] must be used on a method inside a #[subscriber] impl block",
    )
    .to_compile_error()
    .into()
}
