/// Static completion metadata for Twig's built-in keywords, functions,
/// tests, filters and `loop` properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub label: &'static str,
    pub detail: &'static str,
    /// Snippet inserted instead of the label, in LSP snippet syntax.
    pub snippet: Option<&'static str>,
}

const fn item(label: &'static str, detail: &'static str) -> Builtin {
    Builtin {
        label,
        detail,
        snippet: None,
    }
}

const fn snippet(label: &'static str, detail: &'static str, snippet: &'static str) -> Builtin {
    Builtin {
        label,
        detail,
        snippet: Some(snippet),
    }
}

/// Tag keywords offered after `{%`.
pub const KEYWORDS: &[Builtin] = &[
    snippet("if", "Conditional statement", "if ${1:condition} %}\n\t$0\n{% endif"),
    snippet("elseif", "Else-if branch", "elseif ${1:condition}"),
    item("else", "Else branch"),
    item("endif", "End if statement"),
    snippet("for", "For loop", "for ${1:item} in ${2:items} %}\n\t$0\n{% endfor"),
    item("endfor", "End for loop"),
    snippet("block", "Define a block", "block ${1:name} %}\n\t$0\n{% endblock"),
    item("endblock", "End block"),
    snippet("extends", "Extend a template", "extends '${1:template}'"),
    snippet("include", "Include a template", "include '${1:template}'"),
    snippet("set", "Set a variable", "set ${1:name} = ${2:value}"),
    item("endset", "End set block"),
    snippet("macro", "Define a macro", "macro ${1:name}(${2:args}) %}\n\t$0\n{% endmacro"),
    item("endmacro", "End macro"),
    snippet("import", "Import macros", "import '${1:template}' as ${2:name}"),
    snippet("from", "Import specific macros", "from '${1:template}' import ${2:macro}"),
    snippet("with", "Pass variables", "with { ${1:key}: ${2:value} }"),
    snippet("apply", "Apply filter to block", "apply ${1:filter} %}\n\t$0\n{% endapply"),
    item("endapply", "End apply block"),
    snippet(
        "autoescape",
        "Auto-escape block",
        "autoescape '${1|html,js,css,url,html_attr|}' %}\n\t$0\n{% endautoescape",
    ),
    item("endautoescape", "End autoescape"),
    snippet(
        "embed",
        "Embed a template",
        "embed '${1:template}' %}\n\t{% block ${2:name} %}\n\t\t$0\n\t{% endblock %}\n{% endembed",
    ),
    item("endembed", "End embed"),
    item("flush", "Flush output buffer"),
    snippet("sandbox", "Sandbox block", "sandbox %}\n\t$0\n{% endsandbox"),
    item("endsandbox", "End sandbox"),
    snippet("use", "Use template traits", "use '${1:template}'"),
    snippet("verbatim", "Raw output (no parsing)", "verbatim %}\n\t$0\n{% endverbatim"),
    item("endverbatim", "End verbatim"),
    snippet("do", "Execute without output", "do ${1:expression}"),
    snippet("cache", "Cache block", "cache '${1:key}' %}\n\t$0\n{% endcache"),
    item("endcache", "End cache"),
    snippet("deprecated", "Mark as deprecated", "deprecated '${1:message}'"),
];

pub const FUNCTIONS: &[Builtin] = &[
    snippet("attribute", "Dynamic attribute access", "attribute(${1:object}, ${2:method})"),
    snippet("block", "Render a block", "block('${1:name}')"),
    snippet("constant", "Get constant value", "constant('${1:name}')"),
    item("country_names", "List country names"),
    item("country_timezones", "List country timezones"),
    item("currency_names", "List currency names"),
    snippet("cycle", "Cycle through values", "cycle(${1:array}, ${2:position})"),
    snippet("date", "Create date object", "date('${1:date}')"),
    snippet("dump", "Debug dump", "dump(${1:variable})"),
    snippet("html_classes", "Generate class list", "html_classes(${1:classes})"),
    snippet("include", "Include template", "include('${1:template}')"),
    item("language_names", "List language names"),
    item("locale_names", "List locale names"),
    snippet("max", "Maximum value", "max(${1:values})"),
    snippet("min", "Minimum value", "min(${1:values})"),
    item("parent", "Parent block content"),
    snippet("random", "Random value", "random(${1:values})"),
    snippet("range", "Generate range", "range(${1:low}, ${2:high})"),
    item("script_names", "List script names"),
    snippet("source", "Template source", "source('${1:template}')"),
    snippet(
        "template_from_string",
        "Template from string",
        "template_from_string('${1:template}')",
    ),
    item("timezone_names", "List timezone names"),
];

/// Tests offered after `is`.
pub const TESTS: &[Builtin] = &[
    snippet("constant", "Test against constant", "constant('${1:name}')"),
    item("defined", "Is defined"),
    snippet("divisible by", "Divisibility test", "divisible by(${1:number})"),
    item("empty", "Is empty"),
    item("even", "Is even"),
    item("iterable", "Is iterable"),
    item("null", "Is null"),
    item("odd", "Is odd"),
    snippet("same as", "Strict equality", "same as(${1:value})"),
];

pub const FILTERS: &[Builtin] = &[
    item("abs", "Absolute value"),
    snippet("batch", "Batch items", "batch(${1:size})"),
    item("capitalize", "Capitalize first char"),
    snippet("column", "Extract column", "column('${1:name}')"),
    snippet("convert_encoding", "Convert encoding", "convert_encoding('${1:to}', '${2:from}')"),
    item("country_name", "Country name"),
    item("currency_name", "Currency name"),
    item("currency_symbol", "Currency symbol"),
    item("data_uri", "Data URI"),
    snippet("date", "Format date", "date('${1:format}')"),
    snippet("date_modify", "Modify date", "date_modify('${1:modifier}')"),
    snippet("default", "Default value", "default('${1:value}')"),
    snippet("escape", "Escape string", "escape('${1|html,js,css,url,html_attr|}')"),
    snippet("e", "Escape (alias)", "e('${1|html,js,css,url,html_attr|}')"),
    snippet("filter", "Filter items", "filter(${1:arrow})"),
    item("first", "First element"),
    snippet("format", "Format string", "format(${1:args})"),
    snippet("format_currency", "Format currency", "format_currency('${1:currency}')"),
    item("format_date", "Format date (locale)"),
    item("format_datetime", "Format datetime"),
    item("format_number", "Format number"),
    item("format_time", "Format time"),
    item("html_to_markdown", "HTML to Markdown"),
    item("inline_css", "Inline CSS"),
    item("inky_to_html", "Inky to HTML"),
    snippet("join", "Join array", "join('${1:glue}')"),
    item("json_encode", "Encode as JSON"),
    item("keys", "Array keys"),
    item("language_name", "Language name"),
    item("last", "Last element"),
    item("length", "Length/count"),
    item("locale_name", "Locale name"),
    item("lower", "Lowercase"),
    snippet("map", "Map items", "map(${1:arrow})"),
    item("markdown_to_html", "Markdown to HTML"),
    snippet("merge", "Merge arrays", "merge(${1:array})"),
    item("nl2br", "Newlines to <br>"),
    snippet("number_format", "Format number", "number_format(${1:decimals})"),
    item("raw", "Raw output"),
    snippet("reduce", "Reduce array", "reduce(${1:arrow})"),
    snippet("replace", "Replace text", "replace({ '${1:from}': '${2:to}' })"),
    item("reverse", "Reverse array/string"),
    snippet("round", "Round number", "round(${1:precision})"),
    snippet("slice", "Slice array/string", "slice(${1:start}, ${2:length})"),
    item("slug", "URL slug"),
    item("sort", "Sort array"),
    item("spaceless", "Remove whitespace"),
    snippet("split", "Split string", "split('${1:delimiter}')"),
    item("striptags", "Strip HTML tags"),
    item("timezone_name", "Timezone name"),
    item("title", "Title case"),
    item("trim", "Trim whitespace"),
    item("u", "Unicode string"),
    item("upper", "Uppercase"),
    item("url_encode", "URL encode"),
];

/// Properties of the `loop` variable inside `{% for %}`.
pub const LOOP_PROPERTIES: &[Builtin] = &[
    item("index", "Current iteration (1-indexed)"),
    item("index0", "Current iteration (0-indexed)"),
    item("revindex", "Iterations from end (1-indexed)"),
    item("revindex0", "Iterations from end (0-indexed)"),
    item("first", "True if first iteration"),
    item("last", "True if last iteration"),
    item("length", "Total number of items"),
    item("parent", "Parent context in nested loops"),
];
