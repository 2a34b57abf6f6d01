//! Reading records and attributes out of SQLite.
//!
//! The caller owns the connection and prepares the data query. Its columns are looked up by name:
//!
//! | column       | type    | used for                       |
//! |--------------|---------|--------------------------------|
//! | `ana_id`     | integer | station number                 |
//! | `lat`, `lon` | real degrees or integer 1e-5 degrees | station coordinates |
//! | `ident`      | text    | mobile station identifier      |
//! | `datetime`   | text    | date and time                  |
//! | `ltype`, `l1`, `l2`   | integer | level                 |
//! | `pind`, `p1`, `p2`    | integer | time range            |
//! | `rep_cod`, `rep_memo` | integer, text | network         |
//! | `var`        | text    | variable code, required        |
//! | `value`      | any     | the value, required            |
//! | `context_id` | integer | attribute lookup               |
//!
//! Any column but `var` and `value` may be NULL.

use rusqlite::{types::ToSql, Connection, Row, Rows, Statement};

use crate::{
    builder::AttributeSource,
    coords::Coords,
    errors::VolndErr,
    record::{Level, Network, Record, TimeRange, VarCode},
    station::Station,
    value::Value,
};

/// Default query used by [`SqliteAttributes::new`].
pub const ATTRIBUTES_SQL: &str =
    "SELECT code, value FROM attributes WHERE context_id = ?1 AND var = ?2";

/// A lazy, single pass stream of records from a prepared statement.
pub struct SqliteRecords<'stmt> {
    rows: Rows<'stmt>,
}

impl<'stmt> SqliteRecords<'stmt> {
    /// Run `stmt` with `params` and stream the resulting rows as records.
    pub fn query<P>(stmt: &'stmt mut Statement<'_>, params: P) -> Result<Self, VolndErr>
    where
        P: IntoIterator,
        P::Item: ToSql,
    {
        let rows = stmt.query(params)?;
        Ok(SqliteRecords { rows })
    }
}

impl<'stmt> Iterator for SqliteRecords<'stmt> {
    type Item = Result<Record, VolndErr>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.next() {
            Ok(Some(row)) => Some(parse_row_to_record(row)),
            Ok(None) => None,
            Err(err) => Some(Err(err.into())),
        }
    }
}

fn parse_row_to_record(row: &Row) -> Result<Record, VolndErr> {
    let var: String = row.get("var")?;
    let var = VarCode::from(var);
    let value = convert_value(&var, row.get("value")?)?;

    let ana_id: Option<i64> = row.get("ana_id")?;
    let ident: Option<String> = row.get("ident")?;
    let coords = parse_coords(row.get("lat")?, row.get("lon")?)?;
    let station = match (ana_id, coords) {
        (Some(id), Some(coords)) => Some(Station {
            id: id.into(),
            coords,
            ident,
        }),
        _ => None,
    };

    let level = row
        .get::<_, Option<i32>>("ltype")?
        .map(|ltype| -> Result<Level, VolndErr> {
            Ok(Level::new(ltype, row.get("l1")?, row.get("l2")?))
        })
        .transpose()?;

    let time_range = row
        .get::<_, Option<i32>>("pind")?
        .map(|pind| -> Result<TimeRange, VolndErr> {
            Ok(TimeRange::new(pind, row.get("p1")?, row.get("p2")?))
        })
        .transpose()?;

    let rep_cod: Option<i32> = row.get("rep_cod")?;
    let rep_memo: Option<String> = row.get("rep_memo")?;
    let network = match (rep_cod, rep_memo) {
        (Some(code), Some(name)) => Some(Network { code, name }),
        _ => None,
    };

    Ok(Record {
        station,
        datetime: row.get("datetime")?,
        level,
        time_range,
        network,
        var,
        value,
        context_id: row.get("context_id")?,
        attributes: vec![],
    })
}

fn parse_coords(
    lat: rusqlite::types::Value,
    lon: rusqlite::types::Value,
) -> Result<Option<Coords>, VolndErr> {
    use rusqlite::types::Value as Sql;

    match (lat, lon) {
        (Sql::Integer(lat), Sql::Integer(lon)) => Ok(Some(Coords::from_fixed(lat, lon))),
        (Sql::Real(lat), Sql::Real(lon)) => Ok(Some(Coords::from((lat, lon)))),
        (Sql::Null, _) | (_, Sql::Null) => Ok(None),
        _ => Err(VolndErr::InvalidValue(
            "latitude and longitude must both be real or both be integer".to_owned(),
        )),
    }
}

fn convert_value(var: &VarCode, val: rusqlite::types::Value) -> Result<Value, VolndErr> {
    use rusqlite::types::Value as Sql;

    match val {
        Sql::Integer(val) => Ok(Value::Int(val)),
        Sql::Real(val) => Ok(Value::Real(val)),
        Sql::Text(val) => Ok(Value::Text(val)),
        Sql::Null => Err(VolndErr::InvalidValue(format!("{} has no value", var))),
        Sql::Blob(_) => Err(VolndErr::InvalidValue(format!("{} is a blob", var))),
    }
}

/// Look attributes up by the context id and variable of each record.
pub struct SqliteAttributes<'conn> {
    stmt: Statement<'conn>,
}

impl<'conn> SqliteAttributes<'conn> {
    /// Use [`ATTRIBUTES_SQL`].
    pub fn new(conn: &'conn Connection) -> Result<Self, VolndErr> {
        Self::with_sql(conn, ATTRIBUTES_SQL)
    }

    /// Use a custom query taking the context id and the variable code as `?1` and `?2`, and
    /// returning the attribute code and value.
    pub fn with_sql(conn: &'conn Connection, sql: &str) -> Result<Self, VolndErr> {
        Ok(SqliteAttributes {
            stmt: conn.prepare(sql)?,
        })
    }
}

impl<'conn> AttributeSource for SqliteAttributes<'conn> {
    fn attributes(&mut self, record: &Record) -> Result<Vec<(VarCode, Value)>, VolndErr> {
        let context_id = match record.context_id {
            Some(id) => id,
            None => return Ok(vec![]),
        };

        let rows = self.stmt.query_map(
            &[
                &context_id as &dyn ToSql,
                &record.var.as_str() as &dyn ToSql,
            ],
            |row| {
                let code: String = row.get(0)?;
                let value: rusqlite::types::Value = row.get(1)?;
                Ok((code, value))
            },
        )?;

        let mut attributes = vec![];
        for row in rows {
            let (code, value) = row?;
            let code = VarCode::from(code);
            let value = convert_value(&code, value)?;
            attributes.push((code, value));
        }

        Ok(attributes)
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
