//! Prompt templates for text-to-SQL and answer synthesis.

/// System prompt for SQL generation.
pub const TEXT_TO_SQL_SYSTEM: &str =
    "You translate questions about a relational database into a single SQL query. \
     Reply using exactly the requested line format and nothing else.";

/// System prompt for turning query results into an answer.
pub const SYNTHESIS_SYSTEM: &str =
    "You answer questions using the result of a SQL query. \
     Be concise and only state what the result supports.";

/// Build the text-to-SQL prompt.
///
/// # Arguments
///
/// * `question` - User question
/// * `schema` - Schema context (one `CREATE TABLE` per table)
/// * `dialect` - SQL dialect name, e.g. `sqlite`
pub fn text_to_sql(question: &str, schema: &str, dialect: &str) -> String {
    format!(
        r#"Write one syntactically correct {dialect} query that answers the question below.
Select only the columns needed to answer it, never every column of a table.
Order the rows by a relevant column when that makes the answer more useful.
Use only tables and columns that appear in the schema, and qualify column names with their table when more than one table is involved.

Reply in this format, each part on its own line:

Question: the question
SQLQuery: the SQL query to run
SQLResult: the result of the query
Answer: the final answer

Schema:
{schema}

Question: {question}
SQLQuery: "#,
        dialect = dialect,
        schema = schema,
        question = question,
    )
}

/// Build the answer synthesis prompt.
///
/// # Arguments
///
/// * `question` - User question
/// * `sql` - Query that was executed
/// * `result` - Rows (or error text) produced by the query
pub fn synthesis(question: &str, sql: &str, result: &str) -> String {
    format!(
        "Question: {}\nSQL: {}\nSQL result:\n{}\n\nAnswer:",
        question, sql, result
    )
}
