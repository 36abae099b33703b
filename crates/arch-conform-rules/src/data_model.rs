//! Shared lookup of persistence data models.

use arch_conform_core::{SymbolModel, TypeSymbol};

/// Default base class of every data model.
pub const DEFAULT_BASE_CLASS: &str = "DataModelBase";

/// Name suffix of data model types.
pub const DATA_MODEL_SUFFIX: &str = "DataModel";

/// Non-abstract classes deriving from `base_class`, excluding the base itself.
pub fn real_data_models<'a>(
    symbols: SymbolModel<'a>,
    base_class: &'a str,
) -> impl Iterator<Item = &'a TypeSymbol> + 'a {
    symbols.types().iter().filter(move |ty| {
        ty.name != base_class
            && ty.is_concrete_class()
            && symbols.derives_from_class(ty, base_class)
    })
}

/// `OrderDataModel` -> `Order`; names without the suffix are their own stem.
pub fn stem(name: &str) -> &str {
    name.strip_suffix(DATA_MODEL_SUFFIX)
        .filter(|s| !s.is_empty())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch_conform_core::SymbolTable;

    #[test]
    fn test_stem() {
        assert_eq!(stem("OrderDataModel"), "Order");
        assert_eq!(stem("OrderLine"), "OrderLine");
        assert_eq!(stem("DataModel"), "DataModel");
    }

    #[test]
    fn test_real_data_models_skip_base_and_abstract() {
        let ns = "A.B.Infra.Data.DataModels";
        let table = SymbolTable::new(
            "A.B.Infra.Data",
            vec![
                TypeSymbol::class(ns, "DataModelBase").abstract_type(),
                TypeSymbol::class(ns, "AuditedDataModel")
                    .abstract_type()
                    .extends(["DataModelBase"]),
                TypeSymbol::class(ns, "OrderDataModel").extends(["AuditedDataModel", "DataModelBase"]),
                TypeSymbol::class(ns, "Money"),
            ],
        );
        let names: Vec<&str> = real_data_models(SymbolModel::new(&table), DEFAULT_BASE_CLASS)
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["OrderDataModel"]);
    }
}
