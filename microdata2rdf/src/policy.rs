use crate::extract::Extras;
use crate::registry::{MultipleValues, PropertyDef};

/// The effective ordering and literal datatype for one property.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Policy {
    pub order: MultipleValues,
    pub datatype: Option<String>,
}

impl Policy {
    /// Combines a registry declaration with the enabled extras.
    ///
    /// The declared order is only honoured with
    /// [`Extras::MULTIPLE_VALUES`], otherwise values are always unordered;
    /// the declared datatype only with [`Extras::DATATYPE`].
    pub fn resolve(
        declared_order: Option<MultipleValues>,
        declared_datatype: Option<&str>,
        default_order: MultipleValues,
        extras: Extras,
    ) -> Self {
        let order = if extras.contains(Extras::MULTIPLE_VALUES) {
            declared_order.unwrap_or(default_order)
        } else {
            MultipleValues::Unordered
        };

        let datatype = if extras.contains(Extras::DATATYPE) {
            declared_datatype.map(str::to_string)
        } else {
            None
        };

        Self { order, datatype }
    }

    pub fn for_property(def: Option<&PropertyDef>, default_order: MultipleValues, extras: Extras) -> Self {
        Self::resolve(
            def.and_then(|def| def.multiple_values),
            def.and_then(|def| def.datatype.as_deref()),
            default_order,
            extras,
        )
    }
}
