//! AST visitor for code formatting
//!
//! Statement printers write neither indentation nor the final newline; the
//! list printers (`visit_statement_list`, member and enum bodies) own line
//! structure and comment placement.

use crate::ast::*;
use crate::comments::{Comment, CommentPosition};
use crate::doc::Doc;
use crate::formatter::FormatConfig;
use crate::plugin::{CommentPath, CommentPrinter, Placement, PrintContext, SourceFile};
use crate::span::Span;

/// AST visitor that produces formatted source code
pub struct FormatVisitor<'a> {
    /// Output buffer
    output: String,
    /// Current indentation level
    indent_level: usize,
    /// Formatter configuration
    config: &'a FormatConfig,
    /// Parsed file: comments and text for span lookups
    file: &'a SourceFile,
    /// Comment printer of the active plugin
    printer: &'a dyn CommentPrinter,
    /// Index of next comment to consider
    comment_index: usize,
    /// End offset of the previous item in the current list
    last_end: Option<usize>,
    /// Furthest comment end emitted so far
    emitted_end: usize,
    /// Offsets of the closing `}` of every open body, innermost last
    body_closes: Vec<usize>,
    /// Measuring mode: no comments, no line breaking
    flat: bool,
}

impl<'a> FormatVisitor<'a> {
    pub fn new(config: &'a FormatConfig, file: &'a SourceFile, printer: &'a dyn CommentPrinter) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            config,
            file,
            printer,
            comment_index: 0,
            last_end: None,
            emitted_end: 0,
            body_closes: Vec::new(),
            flat: false,
        }
    }

    pub fn into_output(self) -> String {
        let trimmed = self.output.trim_end();
        if trimmed.is_empty() {
            return String::new();
        }
        // Ensure file ends with a single newline
        let mut result = trimmed.to_string();
        result.push('\n');
        result
    }

    // === Output primitives ===

    /// Write indentation at current level
    fn write_indent(&mut self) {
        let unit = self.config.indent_unit();
        for _ in 0..self.indent_level {
            self.output.push_str(&unit);
        }
    }

    /// Write a string to output
    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Write a newline, dropping trailing whitespace on the current line
    fn writeln(&mut self) {
        let trimmed = self.output.trim_end_matches([' ', '\t']).len();
        self.output.truncate(trimmed);
        self.output.push('\n');
    }

    fn current_line(&self) -> &str {
        let start = self.output.rfind('\n').map_or(0, |pos| pos + 1);
        &self.output[start..]
    }

    /// Whether the current line holds nothing but indentation
    fn at_line_start(&self) -> bool {
        self.current_line().trim().is_empty()
    }

    fn write_doc(&mut self, doc: &Doc) {
        match doc {
            Doc::Text(text) => self.write(text),
            Doc::Hardline => {
                if !self.at_line_start() {
                    self.writeln();
                    self.write_indent();
                }
            }
            Doc::Concat(parts) => {
                for part in parts {
                    self.write_doc(part);
                }
            }
        }
    }

    /// Display width of the current line
    fn current_line_width(&self) -> usize {
        self.current_line()
            .chars()
            .map(|c| if c == '\t' { self.config.indent_size } else { 1 })
            .sum()
    }

    fn would_exceed_max_width(&self, content: &str) -> bool {
        let first_line = content.split('\n').next().unwrap_or("");
        self.current_line_width() + first_line.chars().count() > self.config.max_width
    }

    /// Render with a measuring visitor at the current indentation
    fn render_flat<F: FnOnce(&mut FormatVisitor<'a>)>(&self, render: F) -> String {
        let mut visitor = FormatVisitor {
            output: String::new(),
            indent_level: self.indent_level,
            config: self.config,
            file: self.file,
            printer: self.printer,
            comment_index: 0,
            last_end: None,
            emitted_end: 0,
            body_closes: Vec::new(),
            flat: true,
        };
        render(&mut visitor);
        visitor.output
    }

    fn newlines_between(&self, start: usize, end: usize) -> usize {
        if start >= end {
            return 0;
        }
        Span::new(start, end).text(&self.file.text).matches('\n').count()
    }

    // === Comments ===

    fn peek_comment(&self) -> Option<&'a Comment> {
        if self.flat {
            return None;
        }
        self.file.comments.get(self.comment_index)
    }

    fn has_comment_before(&self, offset: usize) -> bool {
        self.peek_comment().is_some_and(|c| c.span.start < offset)
    }

    fn print_comment(&mut self, comment: &'a Comment, placement: Placement, index: usize) {
        let path = CommentPath {
            comment,
            placement,
            index,
        };
        let doc = self.printer.print_comment(&path, &PrintContext::new(self.config, self.file));
        self.write_doc(&doc);
        self.emitted_end = self.emitted_end.max(comment.span.end);
    }

    /// Emit every comment that starts before `limit` as one run
    ///
    /// Block comments keep the line structure they had in the source (same
    /// line, next line, or after a blank line); line comments always end
    /// their line. With `separate_last` unset nothing follows the final one.
    fn emit_comment_run(&mut self, limit: usize, placement: Placement, separate_last: bool) {
        let mut index = 0;
        while let Some(comment) = self.peek_comment().filter(|c| c.span.start < limit) {
            self.comment_index += 1;
            self.print_comment(comment, placement, index);
            index += 1;

            let next = self
                .peek_comment()
                .map(|c| c.span.start)
                .filter(|&start| start < limit);
            if next.is_none() && !separate_last {
                break;
            }

            let mut newlines = self.newlines_between(comment.span.end, next.unwrap_or(limit));
            if !comment.is_block() {
                newlines = newlines.max(1);
            }
            match newlines {
                0 => self.write(" "),
                1 => {
                    self.writeln();
                    self.write_indent();
                }
                _ => {
                    self.writeln();
                    self.writeln();
                    self.write_indent();
                }
            }
        }
    }

    /// Emit comments inside the item that ended at `item_end` and comments
    /// trailing it on the same line
    ///
    /// Inside a body the scan stops at its closing `}`; comments after it
    /// trail the statement that owns the body.
    fn emit_trailing_comments(&mut self, item_end: usize) {
        let mut index = 0;
        let mut cursor = item_end;
        let mut after_line_comment = false;
        let limit = self.body_closes.last().copied().unwrap_or(usize::MAX);

        while let Some(comment) = self.peek_comment().filter(|c| c.span.start < limit) {
            let interior = comment.span.start < item_end;
            let same_line = comment.position == CommentPosition::Trailing
                && comment.span.start >= cursor
                && self.newlines_between(cursor, comment.span.start) == 0;
            if !interior && !same_line {
                break;
            }

            self.comment_index += 1;
            if after_line_comment {
                self.writeln();
                self.write_indent();
            } else {
                self.write(" ");
            }
            self.print_comment(comment, Placement::Trailing, index);
            index += 1;
            after_line_comment = !comment.is_block();
            cursor = cursor.max(comment.span.end);
        }
    }

    /// Start a list item on a fresh line, keeping one blank line if the
    /// source had one
    fn begin_item(&mut self, item_start: usize) {
        let first = self
            .peek_comment()
            .map(|c| c.span.start)
            .filter(|&start| start < item_start)
            .unwrap_or(item_start);
        if let Some(last_end) = self.last_end {
            if self.newlines_between(last_end, first) >= 2 {
                self.writeln();
            }
        }
        self.write_indent();
    }

    /// One list item: leading comments, the item, trailing comments, newline
    fn visit_list_item<F: FnOnce(&mut Self)>(&mut self, span: Span, lead_limit: usize, print: F) {
        self.begin_item(span.start);
        self.emit_comment_run(lead_limit, Placement::Leading, true);
        print(self);
        self.emit_trailing_comments(span.end);
        self.writeln();
        self.last_end = Some(span.end.max(self.emitted_end));
    }

    /// Comments left before the closing `}` of a body (or end of file)
    fn emit_dangling_comments(&mut self, close: usize) {
        if !self.has_comment_before(close) {
            return;
        }
        if let Some(first) = self.peek_comment() {
            self.begin_item(first.span.start);
        }
        self.emit_comment_run(close, Placement::Dangling, false);
        self.writeln();
    }

    /// Open a `{ ... }` body; returns false (after writing `{}`) when empty
    fn open_body(&mut self, is_empty: bool, close: usize) -> bool {
        self.write("{");
        if is_empty && !self.has_comment_before(close) {
            self.write("}");
            return false;
        }
        self.writeln();
        self.indent_level += 1;
        self.last_end = None;
        self.body_closes.push(close);
        true
    }

    fn close_body(&mut self, close: usize) {
        self.emit_dangling_comments(close);
        self.body_closes.pop();
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
    }

    // === Program ===

    pub fn visit_program(&mut self, program: &Program) {
        self.last_end = None;
        self.visit_statement_list(&program.items);
        self.emit_dangling_comments(usize::MAX);
    }

    fn visit_statement_list(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            if matches!(stmt, Stmt::Empty(_)) {
                continue;
            }
            let span = stmt.span();
            // Comments between modifiers and the keyword lead the declaration
            let lead_limit = stmt.modifiers().map_or(span.start, |m| m.end.max(span.start));
            self.visit_list_item(span, lead_limit, |v| v.visit_statement(stmt));
        }
    }

    // === Statements ===

    fn visit_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(v) => {
                self.write_modifiers(&v.modifiers);
                self.visit_var_decl(v);
                self.write(";");
            }
            Stmt::Function(f) => self.visit_function(f),
            Stmt::Class(c) => self.visit_class(c),
            Stmt::Interface(i) => self.visit_interface(i),
            Stmt::Namespace(n) => self.visit_namespace(n),
            Stmt::Enum(e) => self.visit_enum(e),
            Stmt::TypeAlias(t) => self.visit_type_alias(t),
            Stmt::Import(i) => self.visit_import(i),
            Stmt::Export(e) => self.visit_export(e),
            Stmt::If(i) => self.visit_if(i),
            Stmt::While(w) => {
                self.write("while (");
                self.visit_expr(&w.cond);
                self.write(")");
                self.visit_branch(&w.body);
            }
            Stmt::DoWhile(d) => {
                self.write("do");
                self.visit_branch(&d.body);
                self.write(" while (");
                self.visit_expr(&d.cond);
                self.write(");");
            }
            Stmt::For(f) => self.visit_for(f),
            Stmt::ForOf(f) => {
                self.write("for (");
                self.write(f.kind.as_str());
                self.write(" ");
                self.write(&f.name.name);
                self.write(" of ");
                self.visit_expr(&f.iterable);
                self.write(")");
                self.visit_branch(&f.body);
            }
            Stmt::Return(r) => {
                self.write("return");
                if let Some(value) = &r.value {
                    self.write(" ");
                    self.visit_expr(value);
                }
                self.write(";");
            }
            Stmt::Break(j) | Stmt::Continue(j) => {
                self.write(if matches!(stmt, Stmt::Break(_)) {
                    "break"
                } else {
                    "continue"
                });
                if let Some(label) = &j.label {
                    self.write(" ");
                    self.write(&label.name);
                }
                self.write(";");
            }
            Stmt::Throw(t) => {
                self.write("throw ");
                self.visit_expr(&t.value);
                self.write(";");
            }
            Stmt::Block(b) => self.visit_block(b),
            Stmt::Empty(_) => self.write(";"),
            Stmt::Expr(e) => {
                self.visit_expr(&e.expr);
                self.write(";");
            }
        }
    }

    fn write_modifiers(&mut self, modifiers: &Modifiers) {
        if modifiers.export {
            self.write("export ");
        }
        if modifiers.default {
            self.write("default ");
        }
        if modifiers.declare {
            self.write("declare ");
        }
    }

    /// `let a: T = x, b` without the terminator
    fn visit_var_decl(&mut self, v: &VarStmt) {
        self.write(v.kind.as_str());
        self.write(" ");
        for (i, decl) in v.declarators.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&decl.name.name);
            if decl.definite {
                self.write("!");
            }
            if let Some(ty) = &decl.type_ann {
                self.write(": ");
                self.visit_type(ty);
            }
            if let Some(init) = &decl.init {
                self.write(" = ");
                self.visit_expr(init);
            }
        }
    }

    /// Body of `if`/`while`/`for`: blocks after a space, other statements inline
    fn visit_branch(&mut self, body: &Stmt) {
        match body {
            Stmt::Empty(_) => self.write(";"),
            _ => {
                self.write(" ");
                self.visit_statement(body);
            }
        }
    }

    fn visit_if(&mut self, i: &IfStmt) {
        self.write("if (");
        self.visit_expr(&i.cond);
        self.write(")");
        self.visit_branch(&i.then_branch);

        if let Some(else_branch) = &i.else_branch {
            if matches!(*i.then_branch, Stmt::Block(_)) {
                self.write(" ");
            } else {
                self.writeln();
                self.write_indent();
            }
            self.write("else");
            self.visit_branch(else_branch);
        }
    }

    fn visit_for(&mut self, f: &ForStmt) {
        self.write("for (");
        match &f.init {
            Some(ForInit::Var(v)) => self.visit_var_decl(v),
            Some(ForInit::Expr(e)) => self.visit_expr(e),
            None => {}
        }
        self.write(";");
        if let Some(cond) = &f.cond {
            self.write(" ");
            self.visit_expr(cond);
        }
        self.write(";");
        if let Some(update) = &f.update {
            self.write(" ");
            self.visit_expr(update);
        }
        self.write(")");
        self.visit_branch(&f.body);
    }

    // === Block ===

    fn visit_block(&mut self, block: &Block) {
        let close = block.span.end.saturating_sub(1);
        let is_empty = block.statements.iter().all(|s| matches!(s, Stmt::Empty(_)));
        if self.open_body(is_empty, close) {
            self.visit_statement_list(&block.statements);
            self.close_body(close);
        }
    }

    // === Declarations ===

    fn visit_function(&mut self, f: &FunctionDecl) {
        self.write_modifiers(&f.modifiers);
        self.write("function ");
        self.write(&f.name.name);
        self.visit_type_params(&f.type_params);
        self.visit_params(&f.params);
        if let Some(ret) = &f.return_type {
            self.write(": ");
            self.visit_type(ret);
        }
        match &f.body {
            Some(body) => {
                self.write(" ");
                self.visit_block(body);
            }
            None => self.write(";"),
        }
    }

    fn visit_class(&mut self, c: &ClassDecl) {
        self.write_modifiers(&c.modifiers);
        if c.is_abstract {
            self.write("abstract ");
        }
        self.write("class ");
        self.write(&c.name.name);
        self.visit_type_params(&c.type_params);
        if let Some(extends) = &c.extends {
            self.write(" extends ");
            self.visit_type(extends);
        }
        if !c.implements.is_empty() {
            self.write(" implements ");
            self.visit_type_list(&c.implements, ", ");
        }
        self.write(" ");
        self.visit_members(&c.members, c.span);
    }

    fn visit_interface(&mut self, i: &InterfaceDecl) {
        self.write_modifiers(&i.modifiers);
        self.write("interface ");
        self.write(&i.name.name);
        self.visit_type_params(&i.type_params);
        if !i.extends.is_empty() {
            self.write(" extends ");
            self.visit_type_list(&i.extends, ", ");
        }
        self.write(" ");
        self.visit_members(&i.members, i.span);
    }

    /// Member body of a class or interface spanning `owner`
    fn visit_members(&mut self, members: &[Member], owner: Span) {
        let close = owner.end.saturating_sub(1);
        if self.open_body(members.is_empty(), close) {
            for member in members {
                self.visit_list_item(member.span, member.span.start, |v| v.visit_member(member));
            }
            self.close_body(close);
        }
    }

    fn visit_member(&mut self, member: &Member) {
        for modifier in &member.modifiers {
            self.write(modifier);
            self.write(" ");
        }
        match &member.kind {
            MemberKind::Field {
                name,
                optional,
                definite,
                type_ann,
                init,
            } => {
                self.write(&self.property_name(name));
                if *optional {
                    self.write("?");
                }
                if *definite {
                    self.write("!");
                }
                if let Some(ty) = type_ann {
                    self.write(": ");
                    self.visit_type(ty);
                }
                if let Some(init) = init {
                    self.write(" = ");
                    self.visit_expr(init);
                }
                self.write(";");
            }
            MemberKind::Method {
                name,
                accessor,
                optional,
                type_params,
                params,
                return_type,
                body,
            } => {
                match accessor {
                    Some(Accessor::Get) => self.write("get "),
                    Some(Accessor::Set) => self.write("set "),
                    None => {}
                }
                self.write(&self.property_name(name));
                if *optional {
                    self.write("?");
                }
                self.visit_type_params(type_params);
                self.visit_params(params);
                if let Some(ret) = return_type {
                    self.write(": ");
                    self.visit_type(ret);
                }
                self.visit_optional_body(body.as_ref());
            }
            MemberKind::Constructor { params, body } => {
                self.write("constructor");
                self.visit_params(params);
                self.visit_optional_body(body.as_ref());
            }
            MemberKind::Index {
                key,
                key_type,
                value_type,
            } => {
                self.write("[");
                self.write(&key.name);
                self.write(": ");
                self.visit_type(key_type);
                self.write("]: ");
                self.visit_type(value_type);
                self.write(";");
            }
        }
    }

    fn visit_optional_body(&mut self, body: Option<&Block>) {
        match body {
            Some(block) => {
                self.write(" ");
                self.visit_block(block);
            }
            None => self.write(";"),
        }
    }

    fn visit_namespace(&mut self, n: &NamespaceDecl) {
        self.write_modifiers(&n.modifiers);
        self.write("namespace ");
        let name: Vec<&str> = n.name.iter().map(|id| id.name.as_str()).collect();
        self.write(&name.join("."));
        self.write(" ");
        let close = n.span.end.saturating_sub(1);
        let is_empty = n.body.iter().all(|s| matches!(s, Stmt::Empty(_)));
        if self.open_body(is_empty, close) {
            self.visit_statement_list(&n.body);
            self.close_body(close);
        }
    }

    fn visit_enum(&mut self, e: &EnumDecl) {
        self.write_modifiers(&e.modifiers);
        if e.is_const {
            self.write("const ");
        }
        self.write("enum ");
        self.write(&e.name.name);
        self.write(" ");

        let close = e.span.end.saturating_sub(1);
        if self.open_body(e.members.is_empty(), close) {
            let count = e.members.len();
            for (i, member) in e.members.iter().enumerate() {
                self.visit_list_item(member.span, member.span.start, |v| {
                    v.write(&v.property_name(&member.name));
                    if let Some(init) = &member.init {
                        v.write(" = ");
                        v.visit_expr(init);
                    }
                    if i + 1 < count || v.config.trailing_commas {
                        v.write(",");
                    }
                });
            }
            self.close_body(close);
        }
    }

    fn visit_type_alias(&mut self, t: &TypeAliasDecl) {
        self.write_modifiers(&t.modifiers);
        self.write("type ");
        self.write(&t.name.name);
        self.visit_type_params(&t.type_params);
        self.write(" = ");
        self.visit_type(&t.ty);
        self.write(";");
    }

    fn visit_import(&mut self, import: &ImportDecl) {
        self.write("import ");
        let mut clauses = Vec::new();
        if let Some(default) = &import.default {
            clauses.push(default.name.clone());
        }
        if let Some(namespace) = &import.namespace {
            clauses.push(format!("* as {}", namespace.name));
        }
        if let Some(named) = &import.named {
            clauses.push(format_specifiers(named));
        }
        if !clauses.is_empty() {
            self.write(&clauses.join(", "));
            self.write(" from ");
        }
        self.write(&self.string_literal(&import.source));
        self.write(";");
    }

    fn visit_export(&mut self, export: &ExportDecl) {
        self.write("export ");
        match &export.kind {
            ExportKind::Named { specifiers, source } => {
                self.write(&format_specifiers(specifiers));
                if let Some(source) = source {
                    self.write(" from ");
                    self.write(&self.string_literal(source));
                }
            }
            ExportKind::All { alias, source } => {
                self.write("* ");
                if let Some(alias) = alias {
                    self.write("as ");
                    self.write(&alias.name);
                    self.write(" ");
                }
                self.write("from ");
                self.write(&self.string_literal(source));
            }
            ExportKind::Default(expr) => {
                self.write("default ");
                self.visit_expr(expr);
            }
        }
        self.write(";");
    }

    // === Parameters ===

    fn visit_type_params(&mut self, params: &[TypeParam]) {
        if params.is_empty() {
            return;
        }
        self.write("<");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&param.name.name);
            if let Some(constraint) = &param.constraint {
                self.write(" extends ");
                self.visit_type(constraint);
            }
            if let Some(default) = &param.default {
                self.write(" = ");
                self.visit_type(default);
            }
        }
        self.write(">");
    }

    /// `(a: T, b: U)`, one parameter per line when too wide
    fn visit_params(&mut self, params: &[Param]) {
        if self.flat || params.len() < 2 {
            self.write_params_flat(params);
            return;
        }
        let flat = self.render_flat(|v| v.write_params_flat(params));
        if self.would_exceed_max_width(&flat) {
            self.write_params_multiline(params);
        } else {
            self.write_params_flat(params);
        }
    }

    fn write_params_flat(&mut self, params: &[Param]) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.visit_param(param);
        }
        self.write(")");
    }

    fn write_params_multiline(&mut self, params: &[Param]) {
        self.write("(");
        self.writeln();
        self.indent_level += 1;
        for (i, param) in params.iter().enumerate() {
            self.write_indent();
            self.visit_param(param);
            // A rest parameter cannot take a trailing comma
            let is_last = i + 1 == params.len();
            if !is_last || (self.config.trailing_commas && !param.rest) {
                self.write(",");
            }
            self.writeln();
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write(")");
    }

    fn visit_param(&mut self, param: &Param) {
        for modifier in &param.modifiers {
            self.write(modifier);
            self.write(" ");
        }
        if param.rest {
            self.write("...");
        }
        self.write(&param.name.name);
        if param.optional {
            self.write("?");
        }
        if let Some(ty) = &param.type_ann {
            self.write(": ");
            self.visit_type(ty);
        }
        if let Some(default) = &param.default {
            self.write(" = ");
            self.visit_expr(default);
        }
    }

    // === Expressions ===

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(lit) => self.visit_literal(lit),
            Expr::Identifier(id) => self.write(&id.name),
            Expr::This => self.write("this"),
            Expr::Super => self.write("super"),
            Expr::Array(elements) => self.visit_expr_list("[", "]", elements),
            Expr::Object(properties) => self.visit_object(properties),
            Expr::Unary { op, operand } => {
                self.write(op.as_str());
                if needs_space_after_unary(*op, operand) {
                    self.write(" ");
                }
                self.visit_expr(operand);
            }
            Expr::Postfix { op, operand } => {
                self.visit_expr(operand);
                self.write(match op {
                    PostfixOp::Increment => "++",
                    PostfixOp::Decrement => "--",
                });
            }
            Expr::Binary { op, left, right } => {
                self.visit_expr(left);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.visit_expr(right);
            }
            Expr::Assign { op, target, value } => {
                self.visit_expr(target);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.visit_expr(value);
            }
            Expr::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.visit_expr(cond);
                self.write(" ? ");
                self.visit_expr(then_expr);
                self.write(" : ");
                self.visit_expr(else_expr);
            }
            Expr::Call {
                callee,
                type_args,
                args,
            } => {
                self.visit_expr(callee);
                self.visit_type_args(type_args);
                self.visit_expr_list("(", ")", args);
            }
            Expr::New {
                callee,
                type_args,
                args,
            } => {
                self.write("new ");
                self.visit_expr(callee);
                self.visit_type_args(type_args);
                match args {
                    Some(args) => self.visit_expr_list("(", ")", args),
                    None => self.write("()"),
                }
            }
            Expr::Member { object, property } => {
                self.visit_expr(object);
                self.write(".");
                self.write(&property.name);
            }
            Expr::Index { object, index } => {
                self.visit_expr(object);
                self.write("[");
                self.visit_expr(index);
                self.write("]");
            }
            Expr::NonNull(inner) => {
                self.visit_expr(inner);
                self.write("!");
            }
            Expr::As { expr, ty } => {
                self.visit_expr(expr);
                self.write(" as ");
                self.visit_type(ty);
            }
            Expr::TypeAssertion { ty, expr } => {
                self.write("<");
                self.visit_type(ty);
                self.write(">");
                self.visit_expr(expr);
            }
            Expr::Arrow(arrow) => self.visit_arrow(arrow),
            Expr::Group(inner) => {
                self.write("(");
                self.visit_expr(inner);
                self.write(")");
            }
            Expr::Spread(inner) => {
                self.write("...");
                self.visit_expr(inner);
            }
        }
    }

    fn visit_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Number(raw) | Literal::Template(raw) => self.write(raw),
            Literal::String(raw) => self.write(&self.string_literal(raw)),
            Literal::Bool(true) => self.write("true"),
            Literal::Bool(false) => self.write("false"),
            Literal::Null => self.write("null"),
        }
    }

    /// Arguments or array elements, one per line when too wide
    fn visit_expr_list(&mut self, open: &str, close: &str, items: &[Expr]) {
        if self.flat || items.len() < 2 {
            self.write_expr_list_flat(open, close, items);
            return;
        }
        let flat = self.render_flat(|v| v.write_expr_list_flat(open, close, items));
        if self.would_exceed_max_width(&flat) {
            self.write(open);
            self.writeln();
            self.indent_level += 1;
            for (i, item) in items.iter().enumerate() {
                self.write_indent();
                self.visit_expr(item);
                if i + 1 < items.len() || self.config.trailing_commas {
                    self.write(",");
                }
                self.writeln();
            }
            self.indent_level -= 1;
            self.write_indent();
            self.write(close);
        } else {
            self.write_expr_list_flat(open, close, items);
        }
    }

    fn write_expr_list_flat(&mut self, open: &str, close: &str, items: &[Expr]) {
        self.write(open);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.visit_expr(item);
        }
        self.write(close);
    }

    fn visit_object(&mut self, properties: &[Property]) {
        if properties.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{ ");
        for (i, property) in properties.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match property {
                Property::KeyValue { key, value } => {
                    self.write(&self.property_name(key));
                    if let Some(value) = value {
                        self.write(": ");
                        self.visit_expr(value);
                    }
                }
                Property::Spread(expr) => {
                    self.write("...");
                    self.visit_expr(expr);
                }
            }
        }
        self.write(" }");
    }

    fn visit_arrow(&mut self, arrow: &ArrowFunction) {
        let bare = arrow.bare_param
            && arrow.params.len() == 1
            && arrow.params[0].type_ann.is_none()
            && arrow.return_type.is_none();
        if bare {
            self.write(&arrow.params[0].name.name);
        } else {
            self.visit_params(&arrow.params);
        }
        if let Some(ret) = &arrow.return_type {
            self.write(": ");
            self.visit_type(ret);
        }
        self.write(" => ");
        match &arrow.body {
            ArrowBody::Expr(expr) => self.visit_expr(expr),
            ArrowBody::Block(block) => self.visit_block(block),
        }
    }

    // === Types ===

    fn visit_type(&mut self, ty: &TypeRef) {
        match ty {
            TypeRef::Named { name, args } => {
                self.write(name);
                self.visit_type_args(args);
            }
            TypeRef::Array(elem) => {
                self.visit_type(elem);
                self.write("[]");
            }
            TypeRef::Union(members) => self.visit_type_list(members, " | "),
            TypeRef::Intersection(members) => self.visit_type_list(members, " & "),
            TypeRef::Function { params, ret } => {
                self.write_params_flat(params);
                self.write(" => ");
                self.visit_type(ret);
            }
            TypeRef::Literal(raw) => {
                if raw.starts_with('"') || raw.starts_with('\'') {
                    self.write(&self.string_literal(raw));
                } else {
                    self.write(raw);
                }
            }
            TypeRef::Paren(inner) => {
                self.write("(");
                self.visit_type(inner);
                self.write(")");
            }
        }
    }

    fn visit_type_list(&mut self, types: &[TypeRef], separator: &str) {
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            self.visit_type(ty);
        }
    }

    fn visit_type_args(&mut self, args: &[TypeRef]) {
        if args.is_empty() {
            return;
        }
        self.write("<");
        self.visit_type_list(args, ", ");
        self.write(">");
    }

    // === Literals ===

    fn string_literal(&self, raw: &str) -> String {
        normalize_string(raw, self.config.single_quote)
    }

    /// Member and property names: string names get normalized quotes
    fn property_name(&self, name: &str) -> String {
        if name.starts_with('"') || name.starts_with('\'') {
            self.string_literal(name)
        } else {
            name.to_string()
        }
    }
}

fn format_specifiers(specifiers: &[Specifier]) -> String {
    if specifiers.is_empty() {
        return "{}".to_string();
    }
    let parts: Vec<String> = specifiers
        .iter()
        .map(|s| match &s.alias {
            Some(alias) => format!("{} as {}", s.name.name, alias.name),
            None => s.name.name.clone(),
        })
        .collect();
    format!("{{ {} }}", parts.join(", "))
}

/// `- -x` and `+ +x` must not fuse into `--x` / `++x`
fn needs_space_after_unary(op: UnaryOp, operand: &Expr) -> bool {
    match (op, operand) {
        (UnaryOp::Neg, Expr::Unary { op: inner, .. }) => {
            matches!(inner, UnaryOp::Neg | UnaryOp::PreDecrement)
        }
        (UnaryOp::Plus, Expr::Unary { op: inner, .. }) => {
            matches!(inner, UnaryOp::Plus | UnaryOp::PreIncrement)
        }
        _ => false,
    }
}

/// Re-quote a raw string literal with the preferred quote, switching to the
/// other quote when that needs fewer escapes
pub fn normalize_string(raw: &str, single_quote: bool) -> String {
    let mut chars = raw.chars();
    let (Some(open), Some(close)) = (chars.next(), chars.next_back()) else {
        return raw.to_string();
    };
    if open != close || !(open == '"' || open == '\'') {
        return raw.to_string();
    }
    let content = chars.as_str();

    let (preferred, alternate) = if single_quote { ('\'', '"') } else { ('"', '\'') };

    let mut preferred_count = 0;
    let mut alternate_count = 0;
    let mut scan = content.chars();
    while let Some(c) = scan.next() {
        let c = if c == '\\' { scan.next().unwrap_or('\\') } else { c };
        if c == preferred {
            preferred_count += 1;
        } else if c == alternate {
            alternate_count += 1;
        }
    }
    let quote = if preferred_count > alternate_count {
        alternate
    } else {
        preferred
    };

    let mut out = String::with_capacity(raw.len());
    out.push(quote);
    let mut rest = content.chars();
    while let Some(c) = rest.next() {
        match c {
            '\\' => match rest.next() {
                // Quotes of the other kind need no escape
                Some(q @ ('"' | '\'')) if q != quote => out.push(q),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::normalize_string;
    use rstest::rstest;

    #[rstest]
    #[case("'abc'", false, "\"abc\"")]
    #[case("\"abc\"", true, "'abc'")]
    #[case("'say \"hi\"'", false, "'say \"hi\"'")]
    #[case("'it\\'s'", false, "\"it's\"")]
    #[case("\"a\\\"b\"", true, "'a\"b'")]
    #[case("'\\n\\t'", false, "\"\\n\\t\"")]
    fn test_normalize_string(#[case] raw: &str, #[case] single: bool, #[case] expected: &str) {
        assert_eq!(normalize_string(raw, single), expected);
        // normalizing twice changes nothing
        assert_eq!(normalize_string(expected, single), expected);
    }
}
