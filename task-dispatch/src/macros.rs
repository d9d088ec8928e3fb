/// Builds a [`TaskRequest`](crate::TaskRequest) from a callable and its
/// arguments.
///
/// Positional arguments follow the callable, separated by commas. Named
/// arguments come after a semicolon as `name = value` pairs.
///
/// The callable may be a [`Callable`](crate::Callable) or a reference to one;
/// it is cloned, so it stays usable for further requests.
///
/// # Examples
///
/// ```rust,ignore
/// let add = Callable::new(add_fn).with_name("add");
///
/// let plain = request!(add, 2, 3);
/// let named = request!(add, 2, 3; scale = 10);
/// let only_named = request!(add; scale = 10);
/// ```
#[macro_export]
macro_rules! request {
    (
        $callable:expr $(, $arg:expr)* $(; $($name:ident = $value:expr),+)?
    ) => {{
        let request = $crate::Callable::request(&$callable);
        $(
            let request = request.arg($arg);
        )*
        $($(
            let request = request.kwarg(stringify!($name), $value);
        )+)?
        request
    }};
}
