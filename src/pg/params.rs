use std::error::Error;

use postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::types::SqlValue;

/// Borrow gateway values as positional driver parameters.
#[must_use]
pub fn as_sql_refs(args: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|arg| arg as &(dyn ToSql + Sync)).collect()
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Int(i) => (*i).to_sql(ty, out),
            SqlValue::Float(f) => (*f).to_sql(ty, out),
            SqlValue::Text(s) => s.to_sql(ty, out),
            SqlValue::Bool(b) => (*b).to_sql(ty, out),
            SqlValue::Timestamp(dt) => dt.to_sql(ty, out),
            SqlValue::Bytes(bytes) => bytes.to_sql(ty, out),
            SqlValue::Json(value) => value.to_sql(ty, out),
            SqlValue::Null => Ok(IsNull::Yes),
        }
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INT2
            || *ty == Type::INT4
            || *ty == Type::INT8
            || *ty == Type::FLOAT4
            || *ty == Type::FLOAT8
            || *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::CHAR
            || *ty == Type::NAME
            || *ty == Type::BOOL
            || *ty == Type::TIMESTAMP
            || *ty == Type::TIMESTAMPTZ
            || *ty == Type::DATE
            || *ty == Type::JSON
            || *ty == Type::JSONB
            || *ty == Type::BYTEA
    }

    to_sql_checked!();
}
