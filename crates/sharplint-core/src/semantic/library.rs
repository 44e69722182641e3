//! Built-in core library loaded into every compilation.
//!
//! Only the slice of `System`, `System.Collections` and
//! `System.Collections.Generic` that the rules and their tests touch.

use super::symbols::{
    AccessorSet, Accessibility, MemberId, MemberKind, MemberSymbol, SpecialType, SymbolTable,
    TypeId, TypeKind, TypeRef, TypeSymbol,
};

pub const SYSTEM: &str = "System";
pub const COLLECTIONS: &str = "System.Collections";
pub const GENERIC_COLLECTIONS: &str = "System.Collections.Generic";

/// Ids of library types rules compare against by identity.
#[derive(Debug, Clone, Copy)]
pub struct CoreTypes {
    pub object: TypeId,
    pub string: TypeId,
    pub date_time: TypeId,
    pub random: TypeId,
    pub exception: TypeId,
    pub not_implemented: TypeId,
}

struct Loader<'a> {
    table: &'a mut SymbolTable,
    object: Option<TypeRef>,
}

impl Loader<'_> {
    fn add(
        &mut self,
        namespace: &str,
        name: &str,
        kind: TypeKind,
        params: &[&str],
        special: Option<SpecialType>,
    ) -> TypeId {
        let mut symbol = TypeSymbol::new(name, namespace, kind);
        symbol.type_params = params.iter().map(|p| p.to_string()).collect();
        symbol.special = special;
        if kind != TypeKind::Interface {
            symbol.base = self.object.clone();
        }
        self.table.add_type(symbol)
    }

    fn member(&mut self, owner: TypeId, name: &str, kind: MemberKind, ty: Option<TypeRef>) -> MemberId {
        let mut symbol = MemberSymbol::new(name, kind, owner);
        symbol.ty = ty;
        self.table.add_member(symbol)
    }

    fn method(&mut self, owner: TypeId, name: &str, ret: Option<TypeRef>, params: Vec<TypeRef>) -> MemberId {
        let id = self.member(owner, name, MemberKind::Method, ret);
        self.table.member_mut(id).params = params.into_iter().map(Some).collect();
        id
    }

    fn virtual_method(&mut self, owner: TypeId, name: &str, ret: Option<TypeRef>, params: Vec<TypeRef>) {
        let id = self.method(owner, name, ret, params);
        self.table.member_mut(id).modifiers =
            super::symbols::Modifiers::new([crate::syntax::SyntaxKind::VirtualKw]);
    }

    fn static_method(&mut self, owner: TypeId, name: &str, ret: Option<TypeRef>, params: Vec<TypeRef>) {
        let id = self.method(owner, name, ret, params);
        self.table.member_mut(id).is_static = true;
    }

    fn property(&mut self, owner: TypeId, name: &str, ty: TypeRef, is_static: bool) -> MemberId {
        let id = self.member(owner, name, MemberKind::Property, Some(ty));
        let member = self.table.member_mut(id);
        member.is_static = is_static;
        member.accessors = Some(AccessorSet {
            get: Some(Accessibility::Public),
            set: None,
            auto: false,
            set_decl: None,
        });
        id
    }

    fn constructor(&mut self, owner: TypeId, params: Vec<TypeRef>) {
        let name = self.table.ty(owner).name.clone();
        let id = self.member(owner, &name, MemberKind::Constructor, None);
        self.table.member_mut(id).params = params.into_iter().map(Some).collect();
    }

    fn enumeration(&mut self, namespace: &str, name: &str, members: &[&str]) -> TypeId {
        let id = self.add(namespace, name, TypeKind::Enum, &[], None);
        for member in members {
            let m = self.member(id, member, MemberKind::EnumMember, Some(TypeRef::named(id)));
            self.table.member_mut(m).is_static = true;
        }
        self.table.ty_mut(id).enum_members = members.iter().map(|m| m.to_string()).collect();
        id
    }
}

fn special_ref(table: &SymbolTable, special: SpecialType) -> TypeRef {
    table.special_ref(special).unwrap_or(TypeRef::Null)
}

/// Loads the core library into `table` and returns the well-known ids.
pub fn load_core_library(table: &mut SymbolTable) -> CoreTypes {
    let mut lib = Loader { table, object: None };

    let object = lib.add(SYSTEM, "Object", TypeKind::Class, &[], Some(SpecialType::Object));
    lib.object = Some(TypeRef::named(object));
    let obj = TypeRef::named(object);

    let primitives = [
        ("String", TypeKind::Class, SpecialType::String),
        ("Void", TypeKind::Struct, SpecialType::Void),
        ("Boolean", TypeKind::Struct, SpecialType::Bool),
        ("Char", TypeKind::Struct, SpecialType::Char),
        ("SByte", TypeKind::Struct, SpecialType::SByte),
        ("Byte", TypeKind::Struct, SpecialType::Byte),
        ("Int16", TypeKind::Struct, SpecialType::Int16),
        ("UInt16", TypeKind::Struct, SpecialType::UInt16),
        ("Int32", TypeKind::Struct, SpecialType::Int32),
        ("UInt32", TypeKind::Struct, SpecialType::UInt32),
        ("Int64", TypeKind::Struct, SpecialType::Int64),
        ("UInt64", TypeKind::Struct, SpecialType::UInt64),
        ("Single", TypeKind::Struct, SpecialType::Single),
        ("Double", TypeKind::Struct, SpecialType::Double),
        ("Decimal", TypeKind::Struct, SpecialType::Decimal),
    ];
    for (name, kind, special) in primitives {
        lib.add(SYSTEM, name, kind, &[], Some(special));
    }
    let string = special_ref(lib.table, SpecialType::String);
    let int = special_ref(lib.table, SpecialType::Int32);
    let boolean = special_ref(lib.table, SpecialType::Bool);
    let void = special_ref(lib.table, SpecialType::Void);
    let string_id = lib.table.special(SpecialType::String).unwrap_or(object);
    lib.table.ty_mut(string_id).sealed = true;

    lib.virtual_method(object, "Equals", Some(boolean.clone()), vec![obj.clone()]);
    lib.virtual_method(object, "GetHashCode", Some(int.clone()), vec![]);
    lib.virtual_method(object, "ToString", Some(string.clone()), vec![]);
    if let Some(int_id) = int.type_id() {
        lib.static_method(int_id, "Parse", Some(int.clone()), vec![string.clone()]);
        let max = lib.member(int_id, "MaxValue", MemberKind::Field, Some(int.clone()));
        lib.table.member_mut(max).is_static = true;
    }
    lib.property(string_id, "Length", int.clone(), false);
    let empty = lib.member(string_id, "Empty", MemberKind::Field, Some(string.clone()));
    lib.table.member_mut(empty).is_static = true;

    let date_time = lib.add(SYSTEM, "DateTime", TypeKind::Struct, &[], None);
    let dt = TypeRef::named(date_time);
    for name in ["Now", "UtcNow", "Today"] {
        lib.property(date_time, name, dt.clone(), true);
    }
    lib.property(date_time, "Year", int.clone(), false);

    let random = lib.add(SYSTEM, "Random", TypeKind::Class, &[], None);
    lib.constructor(random, vec![]);
    lib.constructor(random, vec![int.clone()]);
    lib.method(random, "Next", Some(int.clone()), vec![]);
    lib.method(random, "Next", Some(int.clone()), vec![int.clone()]);

    let exception = lib.add(SYSTEM, "Exception", TypeKind::Class, &[], None);
    lib.constructor(exception, vec![]);
    lib.constructor(exception, vec![string.clone()]);
    lib.property(exception, "Message", string.clone(), false);
    let derived_exception = |lib: &mut Loader<'_>, name: &str| {
        let id = lib.add(SYSTEM, name, TypeKind::Class, &[], None);
        lib.table.ty_mut(id).base = Some(TypeRef::named(exception));
        lib.constructor(id, vec![]);
        lib.constructor(id, vec![string.clone()]);
        id
    };
    let not_implemented = derived_exception(&mut lib, "NotImplementedException");
    derived_exception(&mut lib, "InvalidOperationException");
    derived_exception(&mut lib, "ArgumentException");

    let disposable = lib.add(SYSTEM, "IDisposable", TypeKind::Interface, &[], None);
    lib.method(disposable, "Dispose", Some(void.clone()), vec![]);

    let console = lib.add(SYSTEM, "Console", TypeKind::Class, &[], None);
    lib.static_method(console, "WriteLine", Some(void.clone()), vec![]);
    lib.static_method(console, "WriteLine", Some(void.clone()), vec![obj.clone()]);

    lib.enumeration(
        SYSTEM,
        "DayOfWeek",
        &["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"],
    );

    let enumerable = lib.add(COLLECTIONS, "IEnumerable", TypeKind::Interface, &[], None);

    let t = TypeRef::param("T");
    let generic_enumerable = lib.add(GENERIC_COLLECTIONS, "IEnumerable", TypeKind::Interface, &["T"], None);
    lib.table.ty_mut(generic_enumerable).interfaces = vec![TypeRef::named(enumerable)];

    let collection = lib.add(GENERIC_COLLECTIONS, "ICollection", TypeKind::Interface, &["T"], None);
    lib.table.ty_mut(collection).interfaces =
        vec![TypeRef::generic(generic_enumerable, vec![t.clone()])];
    lib.property(collection, "Count", int.clone(), false);
    lib.method(collection, "Add", Some(void.clone()), vec![t.clone()]);

    let list_interface = lib.add(GENERIC_COLLECTIONS, "IList", TypeKind::Interface, &["T"], None);
    lib.table.ty_mut(list_interface).interfaces = vec![TypeRef::generic(collection, vec![t.clone()])];

    let list = lib.add(GENERIC_COLLECTIONS, "List", TypeKind::Class, &["T"], None);
    lib.table.ty_mut(list).interfaces = vec![TypeRef::generic(list_interface, vec![t.clone()])];
    lib.constructor(list, vec![]);
    lib.constructor(list, vec![int.clone()]);
    lib.property(list, "Count", int.clone(), false);
    lib.method(list, "Add", Some(void.clone()), vec![t.clone()]);

    let (k, v) = (TypeRef::param("TKey"), TypeRef::param("TValue"));
    let pair = lib.add(GENERIC_COLLECTIONS, "KeyValuePair", TypeKind::Struct, &["TKey", "TValue"], None);
    lib.property(pair, "Key", k.clone(), false);
    lib.property(pair, "Value", v.clone(), false);
    let dictionary = lib.add(GENERIC_COLLECTIONS, "Dictionary", TypeKind::Class, &["TKey", "TValue"], None);
    lib.table.ty_mut(dictionary).interfaces = vec![TypeRef::generic(
        collection,
        vec![TypeRef::generic(pair, vec![k.clone(), v.clone()])],
    )];
    lib.constructor(dictionary, vec![]);
    lib.property(dictionary, "Count", int, false);
    lib.method(dictionary, "Add", Some(void), vec![k, v]);

    CoreTypes {
        object,
        string: string_id,
        date_time,
        random,
        exception,
        not_implemented,
    }
}
