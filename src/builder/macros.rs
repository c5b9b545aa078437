//! Macros for declaring table-driven machines.

/// Declare a list of table-driven states.
///
/// Each entry is a state name, an optional role (`initial` or `terminal`;
/// standard otherwise) and an optional table mapping values of the `value`
/// payload field to target states. Expands to
/// `Result<Vec<StateDefinition<Env>>, BuildError>`.
///
/// # Example
///
/// ```
/// use stepwise::collection::StateDefinition;
/// use stepwise::table_states;
///
/// let states: Vec<StateDefinition> = table_states! {
///     Start: initial { "1" => S1 };
///     S1 { "3" => S3, "2" => S2 };
///     S2 { "4" => End };
///     S3 { "3" => S3, "2" => S2, "1" => S1 };
///     End: terminal;
/// }
/// .unwrap();
///
/// assert_eq!(states.len(), 5);
/// ```
#[macro_export]
macro_rules! table_states {
    (
        $(
            $name:ident $(: $role:ident)? $({ $($value:literal => $target:ident),* $(,)? })?
        );* $(;)?
    ) => {{
        let built: ::std::result::Result<
            ::std::vec::Vec<$crate::builder::TableState>,
            $crate::builder::BuildError,
        > = ::std::vec![
            $(
                $crate::builder::StateBuilder::new(stringify!($name))
                    $(.$role())?
                    $($(.on($value, stringify!($target)))*)?
                    .build()
            ),*
        ]
        .into_iter()
        .collect();
        built.map(|states| {
            states
                .into_iter()
                .map($crate::builder::share)
                .collect::<::std::vec::Vec<_>>()
        })
    }};
}
