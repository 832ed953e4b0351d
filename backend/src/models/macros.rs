/// Implements [`Merge`](crate::models::Merge) for a struct whose fields are all
/// `Option<_>`, copying every `Some` value of the patch over the receiver and
/// leaving fields the patch does not carry untouched.
///
/// Usage:
///   impl_merge!(TodoFields { title, description, due_date });
#[macro_export]
macro_rules! impl_merge {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::models::Merge for $name {
            fn merge(&mut self, patch: Self) {
                $(
                    if patch.$field.is_some() {
                        self.$field = patch.$field;
                    }
                )+
            }
        }
    };
}
