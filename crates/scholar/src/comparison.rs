//! Comparison utilities for sorting and ordering BSON values.
//!
//! Values of different types are ordered by type bracket the way MongoDB
//! orders them (null < numbers < strings < documents < arrays < ...);
//! numbers compare by value across int32, int64 and double.

use std::cmp::Ordering;

use bson::Bson;

/// Returns the numeric value of an int32, int64 or double.
pub fn as_f64(value: &Bson) -> Option<f64> {
    match *value {
        Bson::Int32(n) => Some(f64::from(n)),
        Bson::Int64(n) => Some(n as f64),
        Bson::Double(n) => Some(n),
        _ => None,
    }
}

/// Position of a value's type in the cross-type sort order.
fn type_order(v: &Bson) -> u8 {
    match *v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 13,
        _ => 12,
    }
}

/// Compares two BSON values for sorting purposes.
pub fn compare_bson_values(a: &Bson, b: &Bson) -> Ordering {
    let type_a = type_order(a);
    let type_b = type_order(b);

    if type_a != type_b {
        return type_a.cmp(&type_b);
    }

    if let (Some(fa), Some(fb)) = (as_f64(a), as_f64(b)) {
        return fa.partial_cmp(&fb).unwrap_or(Ordering::Equal);
    }

    match (a, b) {
        (&Bson::String(ref sa), &Bson::String(ref sb)) => sa.cmp(sb),
        (&Bson::Boolean(ba), &Bson::Boolean(bb)) => ba.cmp(&bb),
        (&Bson::ObjectId(ref oa), &Bson::ObjectId(ref ob)) => oa.bytes().cmp(&ob.bytes()),
        (&Bson::DateTime(da), &Bson::DateTime(db)) => da.cmp(&db),
        (&Bson::Array(ref aa), &Bson::Array(ref ab)) => {
            for (x, y) in aa.iter().zip(ab.iter()) {
                let ord = compare_bson_values(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            aa.len().cmp(&ab.len())
        },
        (&Bson::Document(ref da), &Bson::Document(ref db)) => da.len().cmp(&db.len()),
        _ => Ordering::Equal,
    }
}

/// Equality as a filter sees it: numbers compare by value across types.
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(fa), Some(fb)) => fa == fb,
        _ => a == b,
    }
}
