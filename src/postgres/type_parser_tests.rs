#[cfg(test)]
mod tests {
    use crate::postgres::converter::*;
    use crate::postgres::diagnostics::CollectingSink;
    use crate::postgres::type_tag::TypeTag;
    use crate::postgres::types::CellValue;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn convert(tag: &str, value: &str) -> CellValue {
        convert_cell_with(&CollectingSink::new(), &TypeTag::parse(tag), Some(value))
    }

    #[test]
    fn test_bool_parsing() {
        assert_eq!(convert("bool", "t"), CellValue::Bool(true));
        assert_eq!(convert("bool", "f"), CellValue::Bool(false));
        assert_eq!(convert("bool", "x"), CellValue::Null);
        assert_eq!(convert("bool", "true"), CellValue::Null);
    }

    #[test]
    fn test_integer_parsing() {
        // int2
        assert_eq!(convert("int2", "123"), CellValue::Int(123));

        // int4
        assert_eq!(convert("int4", "456789"), CellValue::Int(456789));

        // int8
        assert_eq!(convert("int8", "9876543210"), CellValue::Int(9876543210));

        // oid
        assert_eq!(convert("oid", "4294967295"), CellValue::Int(4294967295));
    }

    #[test]
    fn test_integer_leading_run() {
        assert_eq!(convert("int4", "33abc"), CellValue::Int(33));
        assert_eq!(convert("int4", "1.9"), CellValue::Int(1));
        assert_eq!(convert("int4", "  -7"), CellValue::Int(-7));
        assert_eq!(convert("int4", "+12"), CellValue::Int(12));
    }

    #[test]
    fn test_malformed_integer_falls_back() {
        let sink = CollectingSink::new();
        let result = convert_cell_with(&sink, &TypeTag::Int4, Some("not-a-number"));

        assert_eq!(result, text("not-a-number"));
        assert_eq!(sink.failures(), vec![(TypeTag::Int4, "not-a-number".to_string())]);
    }

    #[test]
    fn test_integer_overflow_falls_back() {
        let sink = CollectingSink::new();
        let result = convert_cell_with(&sink, &TypeTag::Int8, Some("99999999999999999999"));

        assert_eq!(result, text("99999999999999999999"));
        assert_eq!(sink.failures().len(), 1);
    }

    #[test]
    fn test_float_parsing() {
        // float4 - check approximate equality due to precision differences
        let result = convert("float4", "3.14");
        assert!((result.as_f64().unwrap() - 3.14).abs() < 0.001);

        // float8
        let result = convert("float8", "2.718281828");
        assert!((result.as_f64().unwrap() - 2.718281828).abs() < 0.000001);

        // numeric is cast to a float as well
        let result = convert("numeric", "123.456789");
        assert!((result.as_f64().unwrap() - 123.456789).abs() < 0.000001);

        assert_eq!(convert("money", "12.50"), CellValue::Float(12.5));
        assert_eq!(convert("float8", "-1e3"), CellValue::Float(-1000.0));
    }

    #[test]
    fn test_float_special_values() {
        assert!(convert("float8", "NaN").as_f64().unwrap().is_nan());
        assert_eq!(convert("float8", "Infinity"), CellValue::Float(f64::INFINITY));
        assert_eq!(convert("float4", "-Infinity"), CellValue::Float(f64::NEG_INFINITY));
    }

    #[test]
    fn test_malformed_float_falls_back() {
        let sink = CollectingSink::new();
        let values = [
            "$1,000.00", "", "inf", "-inf", "+inf", "-INF", "+nan", "-nan", "+infinity", "1.0.0",
        ];

        for value in values {
            assert_eq!(convert_cell_with(&sink, &TypeTag::Float8, Some(value)), text(value));
        }
        assert_eq!(sink.failures().len(), values.len());
        assert_eq!(sink.failures()[3], (TypeTag::Float8, "-inf".to_string()));
    }

    #[test]
    fn test_json_types() {
        let json_text = r#"{"key": "value", "number": 42}"#;
        assert_eq!(
            convert("json", json_text),
            CellValue::Json(json!({"key": "value", "number": 42}))
        );

        assert_eq!(convert("jsonb", "[1, null]"), CellValue::Json(json!([1, null])));
        assert_eq!(convert("jsonb", "null"), CellValue::Json(serde_json::Value::Null));

        // Invalid JSON should return as string
        let sink = CollectingSink::new();
        let invalid_json = r#"{"invalid": json"#;
        assert_eq!(
            convert_cell_with(&sink, &TypeTag::Json, Some(invalid_json)),
            text(invalid_json)
        );
        assert_eq!(sink.failures(), vec![(TypeTag::Json, invalid_json.to_string())]);
    }

    #[test]
    fn test_timestamp_gets_iso_separator() {
        assert_eq!(convert("timestamp", "2019-09-10 00:00:00"), text("2019-09-10T00:00:00"));
        // Only the first space is replaced
        assert_eq!(
            convert("timestamp", "2019-09-10 00:00:00 BC"),
            text("2019-09-10T00:00:00 BC")
        );
        assert_eq!(convert("timestamp", "2019-09-10T00:00:00"), text("2019-09-10T00:00:00"));
    }

    #[test]
    fn test_timezone_sensitive_types_pass_through() {
        assert_eq!(convert("date", "2023-10-15"), text("2023-10-15"));
        assert_eq!(convert("time", "10:30:00"), text("10:30:00"));
        assert_eq!(convert("timetz", "10:30:00+02"), text("10:30:00+02"));
        assert_eq!(
            convert("timestamptz", "2023-10-15 10:30:00+00"),
            text("2023-10-15 10:30:00+00")
        );
        assert_eq!(convert("abstime", "2023-10-15 10:30:00"), text("2023-10-15 10:30:00"));
        assert_eq!(convert("reltime", "1 day"), text("1 day"));
    }

    #[test]
    fn test_int_range_parsing() {
        assert_eq!(convert("int4range", "[1,10]"), CellValue::IntRange(1, 10));
        assert_eq!(convert("int8range", r#"["1","10"]"#), CellValue::IntRange(1, 10));
        assert_eq!(
            convert("int8range", r#"["-5", 9876543210]"#),
            CellValue::IntRange(-5, 9876543210)
        );
    }

    #[test]
    fn test_malformed_int_range_falls_back() {
        let sink = CollectingSink::new();

        // Postgres' own bound syntax is not a JSON array
        for value in ["[1,10)", "[1]", "[1,null]"] {
            assert_eq!(convert_cell_with(&sink, &TypeTag::Int4range, Some(value)), text(value));
        }
        assert_eq!(sink.failures().len(), 3);
    }

    #[test]
    fn test_date_range_parsing() {
        let result = convert("daterange", r#"["2020-01-01","2020-02-01"]"#);
        assert_eq!(
            result,
            CellValue::DateRange(
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap(),
            )
        );

        let result = convert("tsrange", r#"["2020-01-01 10:00:00","2020-01-01T11:00:00"]"#);
        assert_eq!(
            result,
            CellValue::DateRange(
                Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2020, 1, 1, 11, 0, 0).unwrap(),
            )
        );
    }

    #[test]
    fn test_tstz_range_offsets() {
        let result = convert(
            "tstzrange",
            r#"["2020-01-01 10:00:00+02","2020-01-01 12:30:00+00:00"]"#,
        );
        assert_eq!(
            result,
            CellValue::DateRange(
                Utc.with_ymd_and_hms(2020, 1, 1, 8, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2020, 1, 1, 12, 30, 0).unwrap(),
            )
        );
    }

    #[test]
    fn test_malformed_date_range_falls_back() {
        let sink = CollectingSink::new();
        let value = r#"["yesterday","today"]"#;

        assert_eq!(convert_cell_with(&sink, &TypeTag::Daterange, Some(value)), text(value));
        assert_eq!(sink.failures(), vec![(TypeTag::Daterange, value.to_string())]);
    }

    #[test]
    fn test_to_date_formats() {
        let expected = Utc.with_ymd_and_hms(2023, 10, 15, 10, 30, 0).unwrap();

        assert_eq!(to_date("2023-10-15T10:30:00Z").unwrap(), expected);
        assert_eq!(to_date("2023-10-15 12:30:00+02").unwrap(), expected);
        assert_eq!(to_date("2023-10-15 10:30:00").unwrap(), expected);
        assert_eq!(
            to_date("2023-10-15").unwrap(),
            Utc.with_ymd_and_hms(2023, 10, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            to_date("2023-10-15 10:30:00.250").unwrap().timestamp_millis(),
            expected.timestamp_millis() + 250
        );
        assert!(to_date("15/10/2023").is_err());
    }

    #[test]
    fn test_string_types() {
        // text
        assert_eq!(convert("text", "Hello, World!"), text("Hello, World!"));

        // varchar
        assert_eq!(convert("varchar", "Variable length"), text("Variable length"));

        // uuid
        let uuid = "550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(convert("uuid", uuid), text(uuid));
    }

    #[test]
    fn test_unknown_type() {
        // Unknown type should return as string
        assert_eq!(convert("some_type", "some value"), text("some value"));
        assert_eq!(convert("", "some value"), text("some value"));
    }

    #[test]
    fn test_null_for_every_type() {
        let sink = CollectingSink::new();
        let tags = [
            "bool",
            "int4",
            "float8",
            "json",
            "timestamp",
            "int4range",
            "tstzrange",
            "_int4",
            "text",
        ];
        for tag in tags {
            assert_eq!(convert_cell_with(&sink, &TypeTag::parse(tag), None), CellValue::Null);
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_pass_through_is_idempotent() {
        for tag in ["text", "date", "timestamptz", "timetz", "uuid"] {
            let tag = TypeTag::parse(tag);
            for value in ["", "abc", "2023-10-15 10:30:00+00", "{1,2}"] {
                let once = convert_cell(&tag, Some(value));
                assert_eq!(once, text(value));

                let twice = convert_cell(&tag, once.as_str());
                assert_eq!(twice, once);
            }
        }
    }

    #[test]
    fn test_array_parsing() {
        // Simple integer array
        assert_eq!(
            convert("_int4", "{1,2,3,4}"),
            CellValue::Array(vec![
                CellValue::Int(1),
                CellValue::Int(2),
                CellValue::Int(3),
                CellValue::Int(4),
            ])
        );

        // Text array
        assert_eq!(
            convert("_text", "{hello,world}"),
            CellValue::Array(vec![text("hello"), text("world")])
        );

        assert_eq!(
            convert("_bool", "{t,f,x}"),
            CellValue::Array(vec![
                CellValue::Bool(true),
                CellValue::Bool(false),
                CellValue::Null
            ])
        );
    }

    #[test]
    fn test_empty_array_for_any_element_type() {
        for tag in ["int4", "text", "bool", "json", "tsrange", "_int4"] {
            let sink = CollectingSink::new();
            assert!(convert_array_with(&sink, "{}", &TypeTag::parse(tag)).is_empty());
        }
    }

    #[test]
    fn test_convert_array_direct() {
        let sink = CollectingSink::new();
        let result = convert_array_with(&sink, "{1,2,3,4}", &TypeTag::Int4);
        assert_eq!(
            result,
            vec![CellValue::Int(1), CellValue::Int(2), CellValue::Int(3), CellValue::Int(4)]
        );

        // Bounding characters are dropped without being checked
        let result = convert_array_with(&sink, "[5,6]", &TypeTag::Int4);
        assert_eq!(result, vec![CellValue::Int(5), CellValue::Int(6)]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_array_element_failure_is_contained() {
        let sink = CollectingSink::new();
        let result = convert_cell_with(&sink, &TypeTag::parse("_int4"), Some("{1,x,3}"));

        assert_eq!(
            result,
            CellValue::Array(vec![CellValue::Int(1), text("x"), CellValue::Int(3)])
        );
        assert_eq!(sink.failures(), vec![(TypeTag::Int4, "x".to_string())]);
    }

    #[test]
    fn test_array_of_timestamps() {
        assert_eq!(
            convert("_timestamp", "{2019-09-10 00:00:00,2019-09-11 12:00:00}"),
            CellValue::Array(vec![text("2019-09-10T00:00:00"), text("2019-09-11T12:00:00")])
        );
    }

    #[test]
    fn test_quoted_commas_are_split() {
        // Known limitation: quoting is not understood
        assert_eq!(
            convert("_text", r#"{"a,b",c}"#),
            CellValue::Array(vec![text("\"a"), text("b\""), text("c")])
        );
    }

    #[test]
    fn test_nested_arrays_are_not_balanced() {
        // Known limitation: the outer split cuts through the inner braces
        let result = convert("__int4", "{{1,2},{3,4}}");
        assert_eq!(
            result,
            CellValue::Array(vec![
                CellValue::Array(vec![]),
                CellValue::Array(vec![]),
                CellValue::Array(vec![]),
                CellValue::Array(vec![]),
            ])
        );
    }

    #[test]
    fn test_typed_helpers() {
        assert_eq!(to_boolean("t"), Some(true));
        assert_eq!(to_int("42").unwrap(), 42);
        assert!(to_int("abc").is_err());
        assert_eq!(to_float("0.5").unwrap(), 0.5);
        assert_eq!(to_int_range("[3,4]").unwrap(), (3, 4));
        assert_eq!(to_timestamp_string("2019-09-10 00:00:00"), "2019-09-10T00:00:00");
        assert_eq!(to_json(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
    }
}
