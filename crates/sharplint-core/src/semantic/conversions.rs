//! Conversion classification between constructed types.

use super::symbols::{MemberKind, SpecialType, SymbolTable, TypeRef};
use super::{ConversionKind, ExplicitConversion};

/// Implicit numeric conversions of the language, by source type.
fn implicit_numeric(from: SpecialType, to: SpecialType) -> bool {
    use SpecialType::*;
    let targets: &[SpecialType] = match from {
        SByte => &[Int16, Int32, Int64, Single, Double, Decimal],
        Byte => &[Int16, UInt16, Int32, UInt32, Int64, UInt64, Single, Double, Decimal],
        Int16 => &[Int32, Int64, Single, Double, Decimal],
        UInt16 => &[Int32, UInt32, Int64, UInt64, Single, Double, Decimal],
        Int32 => &[Int64, Single, Double, Decimal],
        UInt32 => &[Int64, UInt64, Single, Double, Decimal],
        Int64 | UInt64 => &[Single, Double, Decimal],
        Char => &[UInt16, Int32, UInt32, Int64, UInt64, Single, Double, Decimal],
        Single => &[Double],
        _ => &[],
    };
    targets.contains(&to)
}

/// Result type of a binary arithmetic operator over two numeric operands.
pub fn promote(left: SpecialType, right: SpecialType) -> Option<SpecialType> {
    use SpecialType::*;
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }
    let either = |t: SpecialType| left == t || right == t;
    let promoted = if either(Decimal) {
        Decimal
    } else if either(Double) {
        Double
    } else if either(Single) {
        Single
    } else if either(UInt64) {
        UInt64
    } else if either(Int64) {
        Int64
    } else if either(UInt32) {
        let signed = |t: SpecialType| matches!(t, SByte | Int16 | Int32);
        if signed(left) || signed(right) {
            Int64
        } else {
            UInt32
        }
    } else {
        Int32
    };
    Some(promoted)
}

/// All types `ty` converts to by implicit reference conversion, with
/// generic arguments substituted through the base chain. Every named type
/// and array reaches `object`.
pub fn supertypes(table: &SymbolTable, ty: &TypeRef) -> Vec<TypeRef> {
    let mut out: Vec<TypeRef> = Vec::new();
    let mut pending: Vec<TypeRef> = Vec::new();
    match ty {
        TypeRef::Named { id, args } => {
            let symbol = table.ty(*id);
            let direct = symbol.base.iter().chain(&symbol.interfaces);
            pending.extend(direct.map(|t| t.substitute(&symbol.type_params, args)));
        }
        TypeRef::Array(element) => {
            for (namespace, name, arity) in [
                (super::library::COLLECTIONS, "IEnumerable", 0),
                (super::library::GENERIC_COLLECTIONS, "IList", 1),
            ] {
                if let Some(id) = table.lookup(namespace, name, arity) {
                    let args = if arity == 0 { Vec::new() } else { vec![(**element).clone()] };
                    pending.push(TypeRef::generic(id, args));
                }
            }
        }
        _ => return out,
    }
    while let Some(next) = pending.pop() {
        if out.contains(&next) {
            continue;
        }
        if let TypeRef::Named { id, args } = &next {
            let symbol = table.ty(*id);
            let direct = symbol.base.iter().chain(&symbol.interfaces);
            pending.extend(direct.map(|t| t.substitute(&symbol.type_params, args)));
        }
        out.push(next);
    }
    if let Some(object) = table.special_ref(SpecialType::Object) {
        if !out.contains(&object) && *ty != object {
            out.push(object);
        }
    }
    out
}

pub fn is_subtype(table: &SymbolTable, from: &TypeRef, to: &TypeRef) -> bool {
    if let (TypeRef::Array(a), TypeRef::Array(b)) = (from, to) {
        return a == b
            || (table.is_reference_type(a) == Some(true) && is_subtype(table, a, b));
    }
    supertypes(table, from).contains(to)
}

fn is_sealed(table: &SymbolTable, ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Named { id, .. } => table.ty(*id).sealed,
        _ => true,
    }
}

fn numeric_like(table: &SymbolTable, ty: &TypeRef) -> bool {
    table.special_of(ty).is_some_and(SpecialType::is_numeric) || table.is_enum(ty)
}

/// Classifies the conversion of a `from` value to `to`. `None` when either
/// side involves an unconstrained type parameter or no conversion exists.
pub fn classify(table: &SymbolTable, from: &TypeRef, to: &TypeRef) -> Option<ConversionKind> {
    if from == to {
        return Some(ConversionKind::Identity);
    }
    if matches!(from, TypeRef::Param(_)) || matches!(to, TypeRef::Param(_)) {
        return None;
    }
    if *from == TypeRef::Null {
        return match to {
            TypeRef::Nullable(_) => Some(ConversionKind::ImplicitNullable),
            _ if table.is_reference_type(to) == Some(true) => Some(ConversionKind::ImplicitReference),
            _ => None,
        };
    }

    match (from, to) {
        (_, TypeRef::Nullable(target)) => {
            let underlying = match from {
                TypeRef::Nullable(inner) => inner.as_ref(),
                other => other,
            };
            if table.is_reference_type(underlying) == Some(true) {
                // object or an interface the underlying type implements
                return is_subtype(table, target, underlying)
                    .then_some(ConversionKind::Explicit(ExplicitConversion::Unboxing));
            }
            return match classify(table, underlying, target)? {
                ConversionKind::Identity | ConversionKind::ImplicitNumeric => {
                    Some(ConversionKind::ImplicitNullable)
                }
                ConversionKind::Explicit(ExplicitConversion::Numeric) => {
                    Some(ConversionKind::Explicit(ExplicitConversion::Nullable))
                }
                _ => None,
            };
        }
        (TypeRef::Nullable(inner), _) => {
            if table.is_reference_type(to) == Some(true) {
                return is_subtype(table, inner, to).then_some(ConversionKind::ImplicitReference);
            }
            return match classify(table, inner, to)? {
                ConversionKind::Identity
                | ConversionKind::ImplicitNumeric
                | ConversionKind::Explicit(ExplicitConversion::Numeric) => {
                    Some(ConversionKind::Explicit(ExplicitConversion::Nullable))
                }
                _ => None,
            };
        }
        _ => {}
    }

    if let (Some(a), Some(b)) = (table.special_of(from), table.special_of(to)) {
        if a.is_numeric() && b.is_numeric() {
            return Some(if implicit_numeric(a, b) {
                ConversionKind::ImplicitNumeric
            } else {
                ConversionKind::Explicit(ExplicitConversion::Numeric)
            });
        }
    }
    if (table.is_enum(from) || table.is_enum(to)) && numeric_like(table, from) && numeric_like(table, to) {
        return Some(ConversionKind::Explicit(ExplicitConversion::Numeric));
    }

    if is_subtype(table, from, to) {
        return Some(ConversionKind::ImplicitReference);
    }

    let from_ref = table.is_reference_type(from) == Some(true);
    let to_ref = table.is_reference_type(to) == Some(true);
    if from_ref && !to_ref && is_subtype(table, to, from) {
        return Some(ConversionKind::Explicit(ExplicitConversion::Unboxing));
    }
    if from_ref && to_ref {
        let from_interface = table.is_interface(from);
        let to_interface = table.is_interface(to);
        let explicit = is_subtype(table, to, from)
            || (from_interface && to_interface)
            || (from_interface && !is_sealed(table, to))
            || (to_interface && !is_sealed(table, from));
        if explicit {
            return Some(ConversionKind::Explicit(ExplicitConversion::Reference));
        }
    }

    user_defined(table, from, to)
}

fn user_defined(table: &SymbolTable, from: &TypeRef, to: &TypeRef) -> Option<ConversionKind> {
    let candidates = [from, to].into_iter().filter_map(TypeRef::type_id);
    let found = candidates.into_iter().any(|owner| {
        table.ty(owner).members.iter().any(|m| {
            let member = table.member(*m);
            member.kind == MemberKind::Conversion
                && member.ty.as_ref() == Some(to)
                && member.params.first().and_then(Option::as_ref) == Some(from)
        })
    });
    found.then_some(ConversionKind::UserDefined)
}

/// Element type produced by iterating a value of type `ty`.
pub fn element_type(table: &SymbolTable, ty: &TypeRef) -> Option<TypeRef> {
    if let TypeRef::Array(element) = ty {
        return Some((**element).clone());
    }
    if table.special_of(ty) == Some(SpecialType::String) {
        return table.special_ref(SpecialType::Char);
    }
    let enumerable = table.lookup(super::library::GENERIC_COLLECTIONS, "IEnumerable", 1)?;
    std::iter::once(ty.clone())
        .chain(supertypes(table, ty))
        .find_map(|t| match t {
            TypeRef::Named { id, mut args } if id == enumerable && args.len() == 1 => args.pop(),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::library::{load_core_library, GENERIC_COLLECTIONS, SYSTEM};
    use crate::semantic::symbols::{MemberSymbol, TypeKind, TypeSymbol};

    fn setup() -> (SymbolTable, TypeRef) {
        let mut table = SymbolTable::new();
        let core = load_core_library(&mut table);
        (table, TypeRef::named(core.object))
    }

    fn special(table: &SymbolTable, special: SpecialType) -> TypeRef {
        table.special_ref(special).unwrap()
    }

    #[test]
    fn test_numeric_conversions() {
        let (table, _) = setup();
        let int = special(&table, SpecialType::Int32);
        let long = special(&table, SpecialType::Int64);
        let byte = special(&table, SpecialType::Byte);
        assert_eq!(classify(&table, &int, &long), Some(ConversionKind::ImplicitNumeric));
        assert_eq!(
            classify(&table, &long, &int),
            Some(ConversionKind::Explicit(ExplicitConversion::Numeric))
        );
        assert_eq!(
            classify(&table, &int, &byte),
            Some(ConversionKind::Explicit(ExplicitConversion::Numeric))
        );
        assert_eq!(promote(SpecialType::Int32, SpecialType::UInt32), Some(SpecialType::Int64));
        assert_eq!(promote(SpecialType::Byte, SpecialType::Int16), Some(SpecialType::Int32));
    }

    #[test]
    fn test_reference_and_boxing() {
        let (table, object) = setup();
        let string = special(&table, SpecialType::String);
        let int = special(&table, SpecialType::Int32);
        let nullable_int = TypeRef::Nullable(Box::new(int.clone()));
        assert_eq!(classify(&table, &string, &object), Some(ConversionKind::ImplicitReference));
        assert_eq!(
            classify(&table, &object, &string),
            Some(ConversionKind::Explicit(ExplicitConversion::Reference))
        );
        assert_eq!(classify(&table, &int, &object), Some(ConversionKind::ImplicitReference));
        assert_eq!(
            classify(&table, &object, &int),
            Some(ConversionKind::Explicit(ExplicitConversion::Unboxing))
        );
        assert_eq!(
            classify(&table, &object, &nullable_int),
            Some(ConversionKind::Explicit(ExplicitConversion::Unboxing))
        );
        assert_eq!(classify(&table, &int, &nullable_int), Some(ConversionKind::ImplicitNullable));
        assert_eq!(classify(&table, &TypeRef::Null, &string), Some(ConversionKind::ImplicitReference));
        assert_eq!(classify(&table, &TypeRef::Null, &int), None);
        assert_eq!(classify(&table, &TypeRef::param("T"), &object), None);
    }

    #[test]
    fn test_generic_supertypes() {
        let (table, object) = setup();
        let int = special(&table, SpecialType::Int32);
        let list = table.lookup(GENERIC_COLLECTIONS, "List", 1).unwrap();
        let enumerable = table.lookup(GENERIC_COLLECTIONS, "IEnumerable", 1).unwrap();
        let list_int = TypeRef::generic(list, vec![int.clone()]);
        let supers = supertypes(&table, &list_int);
        assert!(supers.contains(&TypeRef::generic(enumerable, vec![int.clone()])));
        assert!(supers.contains(&object));
        assert_eq!(element_type(&table, &list_int), Some(int.clone()));
        assert_eq!(
            classify(&table, &list_int, &TypeRef::generic(enumerable, vec![int])),
            Some(ConversionKind::ImplicitReference)
        );
    }

    #[test]
    fn test_user_defined_conversion() {
        let (mut table, _) = setup();
        let meters = table.add_type(TypeSymbol::new("Meters", "", TypeKind::Struct));
        let double = special(&table, SpecialType::Double);
        let mut op = MemberSymbol::new("op_Explicit", MemberKind::Conversion, meters);
        op.ty = Some(TypeRef::named(meters));
        op.params = vec![Some(double.clone())];
        table.add_member(op);
        assert_eq!(
            classify(&table, &double, &TypeRef::named(meters)),
            Some(ConversionKind::UserDefined)
        );
        let random = TypeRef::named(table.lookup(SYSTEM, "Random", 0).unwrap());
        assert_eq!(classify(&table, &double, &random), None);
    }
}
