//! Built-in function table.
//!
//! Expressions are listed per engine in [`EngineId::ALL`] order
//! (DataFusion, DuckDB, ClickHouse); `None` marks an unsupported function.
//! Column names refer to the fixed benchmark dataset schema.

use super::{Category, FunctionSpec};
use crate::engine::EngineId;

type Exprs = [Option<&'static str>; 3];

#[derive(Clone, Copy)]
enum Shape {
    /// Row-wise expression, wrapped in `COUNT` so only one row comes back.
    Scalar,
    AggUngrouped,
    AggGrouped,
    /// Window expression, materialized through a subquery and counted.
    Window,
}

fn wrap(shape: Shape, expr: &str) -> String {
    match shape {
        Shape::Scalar => format!("SELECT COUNT({expr}) FROM {{table}}"),
        Shape::AggUngrouped => format!("SELECT {expr} FROM {{table}}"),
        Shape::AggGrouped => format!("SELECT id % 1000 AS g, {expr} FROM {{table}} GROUP BY g"),
        Shape::Window => format!("SELECT COUNT(w) FROM (SELECT {expr} AS w FROM {{table}})"),
    }
}

fn def(shape: Shape, category: Category, name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    EngineId::ALL
        .into_iter()
        .zip(exprs)
        .filter_map(|(engine, expr)| expr.map(|e| (engine, wrap(shape, e))))
        .fold(FunctionSpec::new(name, category, description), |spec, (engine, sql)| {
            spec.with_query(engine, sql)
        })
}

fn same(expr: &'static str) -> Exprs {
    [Some(expr); 3]
}

fn string(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::Scalar, Category::String, name, description, exprs)
}

fn hash(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::Scalar, Category::Hash, name, description, exprs)
}

fn regex(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::Scalar, Category::Regex, name, description, exprs)
}

fn math(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::Scalar, Category::Math, name, description, exprs)
}

fn trig(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::Scalar, Category::Trig, name, description, exprs)
}

fn datetime(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::Scalar, Category::Datetime, name, description, exprs)
}

fn conditional(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::Scalar, Category::Conditional, name, description, exprs)
}

fn array(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::Scalar, Category::Array, name, description, exprs)
}

fn agg(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::AggUngrouped, Category::AggUngrouped, name, description, exprs)
}

fn agg_grouped(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::AggGrouped, Category::AggGrouped, name, description, exprs)
}

fn window(name: &str, description: &str, exprs: Exprs) -> FunctionSpec {
    def(Shape::Window, Category::Window, name, description, exprs)
}

pub fn functions() -> Vec<FunctionSpec> {
    let mut out = Vec::with_capacity(120);
    out.extend(strings());
    out.extend(hashes());
    out.extend(regexes());
    out.extend(maths());
    out.extend(trigs());
    out.extend(datetimes());
    out.extend(conditionals());
    out.extend(arrays());
    out.extend(aggregates());
    out.extend(grouped_aggregates());
    out.extend(windows());
    out
}

fn strings() -> Vec<FunctionSpec> {
    vec![
        string("upper", "upper(column)", same("upper(str_medium)")),
        string("lower", "lower(column)", same("lower(str_medium)")),
        string(
            "initcap",
            "initcap(column)",
            [Some("initcap(str_medium)"), None, Some("initCap(str_medium)")],
        ),
        string(
            "character_length",
            "character_length(column)",
            [
                Some("character_length(str_medium)"),
                Some("length(str_medium)"),
                Some("lengthUTF8(str_medium)"),
            ],
        ),
        string(
            "octet_length",
            "octet_length(column)",
            [
                Some("octet_length(str_medium)"),
                Some("strlen(str_medium)"),
                Some("length(str_medium)"),
            ],
        ),
        string("ascii", "ascii(column)", same("ascii(str_short)")),
        string(
            "chr",
            "chr(int)",
            [
                Some("chr(int_small % 95 + 32)"),
                Some("chr(CAST(int_small % 95 + 32 AS INTEGER))"),
                Some("char(int_small % 95 + 32)"),
            ],
        ),
        string("concat", "concat(col1, col2)", same("concat(str_short, str_second)")),
        string(
            "concat_ws",
            "concat_ws(sep, col1, col2)",
            same("concat_ws('-', str_short, str_second)"),
        ),
        string(
            "trim",
            "btrim(column)",
            [Some("btrim(str_medium)"), Some("trim(str_medium)"), Some("trimBoth(str_medium)")],
        ),
        string(
            "ltrim",
            "ltrim(column)",
            [Some("ltrim(str_medium)"), Some("ltrim(str_medium)"), Some("trimLeft(str_medium)")],
        ),
        string(
            "rtrim",
            "rtrim(column)",
            [Some("rtrim(str_medium)"), Some("rtrim(str_medium)"), Some("trimRight(str_medium)")],
        ),
        string(
            "lpad",
            "lpad(column, 30, '0')",
            [
                Some("lpad(str_short, 30, '0')"),
                Some("lpad(str_short, 30, '0')"),
                Some("leftPad(str_short, 30, '0')"),
            ],
        ),
        string(
            "rpad",
            "rpad(column, 30, '0')",
            [
                Some("rpad(str_short, 30, '0')"),
                Some("rpad(str_short, 30, '0')"),
                Some("rightPad(str_short, 30, '0')"),
            ],
        ),
        string("left", "left(column, 5)", same("left(str_medium, 5)")),
        string("right", "right(column, 5)", same("right(str_medium, 5)")),
        string("repeat", "repeat(column, 3)", same("repeat(str_short, 3)")),
        string("reverse", "reverse(column)", same("reverse(str_medium)")),
        string(
            "replace",
            "replace(column, 'a', 'z')",
            [
                Some("replace(str_medium, 'a', 'z')"),
                Some("replace(str_medium, 'a', 'z')"),
                Some("replaceAll(str_medium, 'a', 'z')"),
            ],
        ),
        string(
            "translate",
            "translate(column, 'abc', 'xyz')",
            same("translate(str_medium, 'abc', 'xyz')"),
        ),
        string(
            "starts_with",
            "starts_with(column, 'alpha')",
            [
                Some("starts_with(str_pattern, 'alpha')"),
                Some("starts_with(str_pattern, 'alpha')"),
                Some("startsWith(str_pattern, 'alpha')"),
            ],
        ),
        string(
            "ends_with",
            "ends_with(column, 'one')",
            [
                Some("ends_with(str_pattern, 'one')"),
                Some("ends_with(str_pattern, 'one')"),
                Some("endsWith(str_pattern, 'one')"),
            ],
        ),
        string(
            "position",
            "strpos(column, 'alpha')",
            [
                Some("strpos(str_pattern, 'alpha')"),
                Some("strpos(str_pattern, 'alpha')"),
                Some("position(str_pattern, 'alpha')"),
            ],
        ),
        string(
            "substr",
            "substr(column, 1, 5)",
            [
                Some("substr(str_medium, 1, 5)"),
                Some("substr(str_medium, 1, 5)"),
                Some("substring(str_medium, 1, 5)"),
            ],
        ),
        string(
            "split_part",
            "split_part(column, '-', 2)",
            [
                Some("split_part(str_pattern, '-', 2)"),
                Some("split_part(str_pattern, '-', 2)"),
                Some("splitByChar('-', str_pattern)[2]"),
            ],
        ),
        string(
            "levenshtein",
            "levenshtein(col1, col2)",
            [
                Some("levenshtein(str_short, str_second)"),
                Some("levenshtein(str_short, str_second)"),
                Some("editDistance(str_short, str_second)"),
            ],
        ),
    ]
}

fn hashes() -> Vec<FunctionSpec> {
    vec![
        hash(
            "md5",
            "md5(column)",
            [Some("md5(str_short)"), Some("md5(str_short)"), Some("hex(MD5(str_short))")],
        ),
        hash(
            "sha256",
            "sha256(column)",
            [
                Some("sha256(str_short)"),
                Some("sha256(str_short)"),
                Some("hex(SHA256(str_short))"),
            ],
        ),
        hash(
            "to_hex",
            "to_hex(int)",
            [Some("to_hex(int_large)"), Some("to_hex(int_large)"), Some("hex(int_large)")],
        ),
    ]
}

fn regexes() -> Vec<FunctionSpec> {
    vec![
        regex(
            "regexp_replace",
            "regexp_replace(column, pattern, repl)",
            [
                Some(r"regexp_replace(str_pattern, '\d+', 'XXXX')"),
                Some(r"regexp_replace(str_pattern, '\d+', 'XXXX')"),
                Some(r"replaceRegexpOne(str_pattern, '\d+', 'XXXX')"),
            ],
        ),
        regex(
            "regexp_like",
            "regexp_like(column, pattern)",
            [
                Some("regexp_like(str_pattern, '^alpha')"),
                Some("regexp_matches(str_pattern, '^alpha')"),
                Some("match(str_pattern, '^alpha')"),
            ],
        ),
    ]
}

fn maths() -> Vec<FunctionSpec> {
    vec![
        math("abs", "abs(column)", same("abs(float_signed)")),
        math("ceil", "ceil(column)", same("ceil(float_signed)")),
        math("floor", "floor(column)", same("floor(float_signed)")),
        math("round", "round(column, 2)", same("round(float_signed, 2)")),
        math("trunc", "trunc(column)", same("trunc(float_signed)")),
        math("power", "power(column, 2)", same("power(float_pos, 2)")),
        math("sqrt", "sqrt(column)", same("sqrt(float_pos)")),
        math("cbrt", "cbrt(column)", same("cbrt(float_pos)")),
        math("exp", "exp(column)", same("exp(float_angle)")),
        math(
            "ln",
            "ln(column)",
            [Some("ln(float_pos)"), Some("ln(float_pos)"), Some("log(float_pos)")],
        ),
        math("log2", "log2(column)", same("log2(float_pos)")),
        math("log10", "log10(column)", same("log10(float_pos)")),
        math(
            "sign",
            "sign(column)",
            [Some("signum(float_signed)"), Some("sign(float_signed)"), Some("sign(float_signed)")],
        ),
        math(
            "factorial",
            "factorial(column % 20)",
            [
                Some("factorial(int_small % 20)"),
                Some("factorial(CAST(int_small % 20 AS INTEGER))"),
                Some("factorial(int_small % 20)"),
            ],
        ),
        math("gcd", "gcd(col1, col2)", same("gcd(int_small, int_second)")),
        math("lcm", "lcm(col1, col2)", same("lcm(int_small, int_second)")),
    ]
}

fn trigs() -> Vec<FunctionSpec> {
    vec![
        trig("sin", "sin(column)", same("sin(float_angle)")),
        trig("cos", "cos(column)", same("cos(float_angle)")),
        trig("tan", "tan(column)", same("tan(float_angle)")),
        trig("asin", "asin(column / pi())", same("asin(float_angle / pi())")),
        trig("acos", "acos(column / pi())", same("acos(float_angle / pi())")),
        trig("atan", "atan(column)", same("atan(float_signed)")),
        trig("atan2", "atan2(col1, col2)", same("atan2(float_signed, float_pos)")),
    ]
}

fn datetimes() -> Vec<FunctionSpec> {
    vec![
        datetime("date_trunc", "date_trunc('month', column)", same("date_trunc('month', ts)")),
        datetime(
            "date_part_year",
            "date_part('year', column)",
            [Some("date_part('year', ts)"), Some("date_part('year', ts)"), Some("toYear(ts)")],
        ),
        datetime(
            "date_part_month",
            "date_part('month', column)",
            [Some("date_part('month', ts)"), Some("date_part('month', ts)"), Some("toMonth(ts)")],
        ),
        datetime(
            "date_part_dow",
            "date_part('dow', column)",
            [Some("date_part('dow', ts)"), Some("date_part('dow', ts)"), Some("toDayOfWeek(ts)")],
        ),
        datetime(
            "to_unixtime",
            "to_unixtime(column)",
            [Some("to_unixtime(ts)"), Some("epoch(ts)"), Some("toUnixTimestamp(ts)")],
        ),
        datetime(
            "make_date",
            "make_date(2024, month, day)",
            [
                Some("make_date(2024, int_small % 12 + 1, int_small % 28 + 1)"),
                Some("make_date(2024, int_small % 12 + 1, int_small % 28 + 1)"),
                Some("makeDate(2024, int_small % 12 + 1, int_small % 28 + 1)"),
            ],
        ),
    ]
}

fn conditionals() -> Vec<FunctionSpec> {
    vec![
        conditional(
            "coalesce",
            "coalesce(nullable, fallback)",
            same("coalesce(str_nullable, str_second)"),
        ),
        conditional(
            "nullif",
            "nullif(col1, col2)",
            [
                Some("nullif(int_small, int_second)"),
                Some("nullif(int_small, int_second)"),
                Some("nullIf(int_small, int_second)"),
            ],
        ),
        conditional("greatest", "greatest(col1, col2)", same("greatest(int_small, int_second)")),
        conditional("least", "least(col1, col2)", same("least(int_small, int_second)")),
    ]
}

fn arrays() -> Vec<FunctionSpec> {
    vec![
        array(
            "array_has",
            "array_has(arr, 42)",
            [
                Some("array_has(arr_int, 42)"),
                Some("list_contains(arr_int, 42)"),
                Some("has(arr_int, 42)"),
            ],
        ),
        array(
            "array_has_col",
            "array_has(arr, search_col)",
            [
                Some("array_has(arr_int, search_int)"),
                Some("list_contains(arr_int, search_int)"),
                Some("has(arr_int, search_int)"),
            ],
        ),
        array(
            "array_has_any",
            "array_has_any(arr1, arr2)",
            [
                Some("array_has_any(arr_int, arr_int_second)"),
                Some("list_has_any(arr_int, arr_int_second)"),
                Some("hasAny(arr_int, arr_int_second)"),
            ],
        ),
        array(
            "array_has_all",
            "array_has_all(arr1, arr2)",
            [
                Some("array_has_all(arr_int, arr_int_second)"),
                Some("list_has_all(arr_int, arr_int_second)"),
                Some("hasAll(arr_int, arr_int_second)"),
            ],
        ),
        array(
            "array_length",
            "array_length(arr)",
            [Some("array_length(arr_int)"), Some("len(arr_int)"), Some("length(arr_int)")],
        ),
        array(
            "array_position",
            "array_position(arr, val)",
            [
                Some("array_position(arr_int, search_int)"),
                Some("list_position(arr_int, search_int)"),
                Some("indexOf(arr_int, search_int)"),
            ],
        ),
        array(
            "array_element",
            "array_element(arr, 3)",
            [
                Some("array_element(arr_int, 3)"),
                Some("list_extract(arr_int, 3)"),
                Some("arrayElement(arr_int, 3)"),
            ],
        ),
        array(
            "array_append",
            "array_append(arr, val)",
            [
                Some("array_append(arr_int, search_int)"),
                Some("list_append(arr_int, search_int)"),
                Some("arrayPushBack(arr_int, search_int)"),
            ],
        ),
        array(
            "array_prepend",
            "array_prepend(val, arr)",
            [
                Some("array_prepend(search_int, arr_int)"),
                Some("list_prepend(search_int, arr_int)"),
                Some("arrayPushFront(arr_int, search_int)"),
            ],
        ),
        array(
            "array_concat",
            "array_concat(arr1, arr2)",
            [
                Some("array_concat(arr_int, arr_int_second)"),
                Some("list_concat(arr_int, arr_int_second)"),
                Some("arrayConcat(arr_int, arr_int_second)"),
            ],
        ),
        array(
            "array_sort",
            "array_sort(arr)",
            [Some("array_sort(arr_int)"), Some("list_sort(arr_int)"), Some("arraySort(arr_int)")],
        ),
        array(
            "array_reverse",
            "array_reverse(arr)",
            [
                Some("array_reverse(arr_int)"),
                Some("list_reverse(arr_int)"),
                Some("arrayReverse(arr_int)"),
            ],
        ),
        array(
            "array_distinct",
            "array_distinct(arr)",
            [
                Some("array_distinct(arr_int)"),
                Some("list_distinct(arr_int)"),
                Some("arrayDistinct(arr_int)"),
            ],
        ),
        array(
            "array_intersect",
            "array_intersect(arr1, arr2)",
            [
                Some("array_intersect(arr_int, arr_int_second)"),
                Some("list_intersect(arr_int, arr_int_second)"),
                Some("arrayIntersect(arr_int, arr_int_second)"),
            ],
        ),
        array(
            "array_to_string",
            "array_to_string(arr, ',')",
            [
                Some("array_to_string(arr_int, ',')"),
                Some("array_to_string(arr_int, ',')"),
                Some("arrayStringConcat(arr_int, ',')"),
            ],
        ),
    ]
}

fn aggregates() -> Vec<FunctionSpec> {
    vec![
        agg("sum", "sum(column)", same("sum(float_signed)")),
        agg("avg", "avg(column)", same("avg(float_signed)")),
        agg("min_agg", "min(column)", same("min(float_signed)")),
        agg("max_agg", "max(column)", same("max(float_signed)")),
        agg("count_distinct", "count(distinct column)", same("count(distinct int_small)")),
        agg(
            "approx_distinct",
            "approx_distinct(column)",
            [
                Some("approx_distinct(int_large)"),
                Some("approx_count_distinct(int_large)"),
                Some("uniq(int_large)"),
            ],
        ),
        agg(
            "stddev",
            "stddev(column)",
            [
                Some("stddev(float_signed)"),
                Some("stddev(float_signed)"),
                Some("stddevSamp(float_signed)"),
            ],
        ),
        agg(
            "variance",
            "var(column)",
            [Some("var(float_signed)"), Some("var_samp(float_signed)"), Some("varSamp(float_signed)")],
        ),
        agg(
            "bit_and_agg",
            "bit_and(column)",
            [Some("bit_and(int_small)"), Some("bit_and(int_small)"), Some("groupBitAnd(int_small)")],
        ),
        agg(
            "bit_xor_agg",
            "bit_xor(column)",
            [Some("bit_xor(int_small)"), Some("bit_xor(int_small)"), Some("groupBitXor(int_small)")],
        ),
        agg(
            "corr",
            "corr(col1, col2)",
            same("corr(float_signed, float_pos)"),
        ),
    ]
}

fn grouped_aggregates() -> Vec<FunctionSpec> {
    vec![
        agg_grouped("sum_grouped", "sum(column) GROUP BY", same("sum(float_signed)")),
        agg_grouped("avg_grouped", "avg(column) GROUP BY", same("avg(float_signed)")),
        agg_grouped("min_grouped", "min(column) GROUP BY", same("min(float_signed)")),
        agg_grouped("max_grouped", "max(column) GROUP BY", same("max(float_signed)")),
        agg_grouped(
            "count_distinct_grouped",
            "count(distinct) GROUP BY",
            same("count(distinct int_small)"),
        ),
        agg_grouped(
            "approx_distinct_grouped",
            "approx_distinct GROUP BY",
            [
                Some("approx_distinct(int_large)"),
                Some("approx_count_distinct(int_large)"),
                Some("uniq(int_large)"),
            ],
        ),
        agg_grouped(
            "stddev_grouped",
            "stddev GROUP BY",
            [
                Some("stddev(float_signed)"),
                Some("stddev(float_signed)"),
                Some("stddevSamp(float_signed)"),
            ],
        ),
        agg_grouped(
            "variance_grouped",
            "var GROUP BY",
            [Some("var(float_signed)"), Some("var_samp(float_signed)"), Some("varSamp(float_signed)")],
        ),
        agg_grouped(
            "bit_and_grouped",
            "bit_and GROUP BY",
            [Some("bit_and(int_small)"), Some("bit_and(int_small)"), Some("groupBitAnd(int_small)")],
        ),
        agg_grouped(
            "bit_xor_grouped",
            "bit_xor GROUP BY",
            [Some("bit_xor(int_small)"), Some("bit_xor(int_small)"), Some("groupBitXor(int_small)")],
        ),
        agg_grouped(
            "string_agg_grouped",
            "string_agg GROUP BY",
            [
                Some("string_agg(str_short, ',')"),
                Some("string_agg(str_short, ',')"),
                Some("groupConcat(',')(str_short)"),
            ],
        ),
        agg_grouped(
            "array_agg_grouped",
            "array_agg GROUP BY",
            [
                Some("array_agg(int_small)"),
                Some("array_agg(int_small)"),
                Some("groupArray(int_small)"),
            ],
        ),
        agg_grouped(
            "bool_and_grouped",
            "bool_and GROUP BY",
            [Some("bool_and(bool_col)"), Some("bool_and(bool_col)"), Some("min(bool_col)")],
        ),
        agg_grouped(
            "corr_grouped",
            "corr GROUP BY",
            same("corr(float_signed, float_pos)"),
        ),
        agg_grouped(
            "covar_samp_grouped",
            "covar_samp GROUP BY",
            [
                Some("covar_samp(float_signed, float_pos)"),
                Some("covar_samp(float_signed, float_pos)"),
                Some("covarSamp(float_signed, float_pos)"),
            ],
        ),
        agg_grouped(
            "median_grouped",
            "median GROUP BY (exact)",
            [
                Some("median(float_signed)"),
                Some("median(float_signed)"),
                Some("quantileExact(0.5)(float_signed)"),
            ],
        ),
        agg_grouped(
            "approx_median_grouped",
            "approx_median GROUP BY",
            [
                Some("approx_median(float_signed)"),
                Some("approx_quantile(float_signed, 0.5)"),
                Some("quantile(0.5)(float_signed)"),
            ],
        ),
    ]
}

fn windows() -> Vec<FunctionSpec> {
    // ClickHouse's lag/lead equivalents only see rows inside the frame.
    vec![
        window(
            "row_number",
            "row_number() OVER (PARTITION BY g ORDER BY column)",
            same("row_number() OVER (PARTITION BY id % 1000 ORDER BY float_signed)"),
        ),
        window(
            "rank",
            "rank() OVER (PARTITION BY g ORDER BY column)",
            same("rank() OVER (PARTITION BY id % 1000 ORDER BY int_small)"),
        ),
        window(
            "dense_rank",
            "dense_rank() OVER (PARTITION BY g ORDER BY column)",
            same("dense_rank() OVER (PARTITION BY id % 1000 ORDER BY int_small)"),
        ),
        window(
            "ntile",
            "ntile(4) OVER (PARTITION BY g ORDER BY column)",
            [
                Some("ntile(4) OVER (PARTITION BY id % 1000 ORDER BY float_signed)"),
                Some("ntile(4) OVER (PARTITION BY id % 1000 ORDER BY float_signed)"),
                None,
            ],
        ),
        window(
            "lag",
            "lag(column, 1) OVER (PARTITION BY g ORDER BY id)",
            [
                Some("lag(float_signed, 1) OVER (PARTITION BY id % 1000 ORDER BY id)"),
                Some("lag(float_signed, 1) OVER (PARTITION BY id % 1000 ORDER BY id)"),
                Some(
                    "lagInFrame(float_signed, 1) OVER (PARTITION BY id % 1000 ORDER BY id \
                     ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING)",
                ),
            ],
        ),
        window(
            "lead",
            "lead(column, 1) OVER (PARTITION BY g ORDER BY id)",
            [
                Some("lead(float_signed, 1) OVER (PARTITION BY id % 1000 ORDER BY id)"),
                Some("lead(float_signed, 1) OVER (PARTITION BY id % 1000 ORDER BY id)"),
                Some(
                    "leadInFrame(float_signed, 1) OVER (PARTITION BY id % 1000 ORDER BY id \
                     ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING)",
                ),
            ],
        ),
        window(
            "first_value",
            "first_value(column) OVER (PARTITION BY g ORDER BY id)",
            same("first_value(float_signed) OVER (PARTITION BY id % 1000 ORDER BY id)"),
        ),
        window(
            "running_sum",
            "sum(column) OVER (PARTITION BY g ORDER BY id)",
            same("sum(float_signed) OVER (PARTITION BY id % 1000 ORDER BY id)"),
        ),
    ]
}
