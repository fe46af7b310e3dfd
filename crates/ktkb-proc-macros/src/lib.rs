use proc_macro2::{Delimiter, Group, Literal, Span, TokenStream};
use quote::{ToTokens, TokenStreamExt, quote};
use syn::{
    Ident, LitChar, LitInt, LitStr, Path, Token, braced, bracketed, parenthesized,
    parse::{Parse, ParseStream, Parser},
    parse_macro_input,
    punctuated::Punctuated,
    spanned::Spanned,
    token,
};

mod keymap;

struct ResultAcc<T, E> {
    oks: Vec<T>,
    errors: Vec<E>,
}

impl<A, E> FromIterator<Result<A, E>> for ResultAcc<A, E> {
    fn from_iter<T: IntoIterator<Item = Result<A, E>>>(iter: T) -> Self {
        let iter = iter.into_iter();

        let mut oks = Vec::with_capacity(iter.size_hint().0);
        let mut errors = Vec::new();

        for e in iter {
            match e {
                Ok(v) => oks.push(v),
                Err(e) => errors.push(e),
            }
        }

        ResultAcc { oks, errors }
    }
}

fn combine_syn_errors(errors: &[syn::Error]) -> Option<syn::Error> {
    let mut head = errors.first().cloned()?;
    for e in &errors[1..] {
        head.combine(e.clone());
    }

    Some(head)
}

fn ktkb_symbol(module: &str, name: &str) -> TokenStream {
    let module = Ident::new(module, Span::call_site());
    let ident = Ident::new(name, Span::call_site());
    quote! {
        ::ktkb_core::#module::#ident
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub(crate) enum KeyRef {
    Ident(String),
    LitInt(u32),
    LitChr(char),
}

impl KeyRef {
    pub fn ident(str: &str) -> KeyRef {
        Self::Ident(str.to_string())
    }

    pub fn litnum(n: u32) -> KeyRef {
        Self::LitInt(n)
    }
}

impl std::fmt::Display for KeyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyRef::Ident(ident) => f.write_str(ident),
            KeyRef::LitInt(int) => write!(f, "{}", int),
            KeyRef::LitChr(c) => write!(f, "{:?}", c),
        }
    }
}

/// A layer referenced by name or by index.
#[derive(Debug, Clone)]
enum LayerRef {
    Name(LitStr),
    Index(LitInt),
}

impl Parse for LayerRef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(LayerRef::Name(input.parse()?));
        }
        if input.peek(LitInt) {
            return Ok(LayerRef::Index(input.parse()?));
        }
        Err(syn::Error::new(input.span(), "Expected a layer name or index"))
    }
}

#[derive(Debug, Clone)]
enum KeyAction {
    Transparent(Span),
    NoOp(Span),
    StandardKey(KeyRef, Span),
    /// `prefix:Name`, like `c:VolumeUp` or `u:Custom`.
    Prefixed(Ident, Ident),
    /// `mo(..)`, `tg(..)` and the rest of single layer functions.
    Layer(Ident, LayerRef),
    LayerTap(Span, LayerRef, Box<KeyAction>),
    Modified(Ident, Box<KeyAction>),
    ModTap(Ident, Box<KeyAction>),
}

const LAYER_FUNCTIONS: &[&str] = &["mo", "tg", "to", "tor", "tt", "df"];

impl KeyAction {
    fn span(&self) -> Span {
        match self {
            KeyAction::Transparent(span) | KeyAction::NoOp(span) | KeyAction::StandardKey(_, span) => *span,
            KeyAction::Prefixed(prefix, _) => prefix.span(),
            KeyAction::Layer(func, _) | KeyAction::Modified(func, _) | KeyAction::ModTap(func, _) => func.span(),
            KeyAction::LayerTap(span, _, _) => *span,
        }
    }

    fn parse_call(func: Ident, args: ParseStream) -> syn::Result<Self> {
        let name = func.to_string();
        let action = if LAYER_FUNCTIONS.contains(&name.as_str()) {
            KeyAction::Layer(func, args.parse()?)
        } else if name == "lt" {
            let layer = args.parse()?;
            args.parse::<Token![,]>()?;
            KeyAction::LayerTap(func.span(), layer, Box::new(args.parse()?))
        } else if keymap::modifier_bits(&name).is_some() {
            KeyAction::Modified(func, Box::new(args.parse()?))
        } else if keymap::mod_tap_bits(&name).is_some() {
            KeyAction::ModTap(func, Box::new(args.parse()?))
        } else {
            return Err(syn::Error::new(func.span(), format!("Unknown key function: {}", name)));
        };

        let _ = args.parse::<Option<Token![,]>>()?;
        if !args.is_empty() {
            return Err(args.error("Unexpected arguments"));
        }
        Ok(action)
    }
}

impl Parse for KeyAction {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if let Ok(t) = input.parse::<Token![*]>() {
            return Ok(KeyAction::Transparent(t.span));
        }
        if let Ok(t) = input.parse::<Token![_]>() {
            return Ok(KeyAction::NoOp(t.span));
        }

        if input.peek(LitInt) {
            let lit = input.parse::<LitInt>()?;
            return Ok(KeyAction::StandardKey(KeyRef::LitInt(lit.base10_parse()?), lit.span()));
        }
        if input.peek(LitChar) {
            let lit = input.parse::<LitChar>()?;
            return Ok(KeyAction::StandardKey(KeyRef::LitChr(lit.value()), lit.span()));
        }
        if input.peek(LitStr) {
            let lit = input.parse::<LitStr>()?;
            let mut chars = lit.value().chars().collect::<Vec<_>>();
            if chars.len() != 1 {
                return Err(syn::Error::new(lit.span(), "String keys must hold exactly one character"));
            }
            return Ok(KeyAction::StandardKey(KeyRef::LitChr(chars.remove(0)), lit.span()));
        }

        let first_ident = input.parse::<Ident>()?;
        if input.peek(Token![:]) && !input.peek(Token![::]) {
            input.parse::<Token![:]>()?;
            let name = input.parse::<Ident>()?;
            return Ok(KeyAction::Prefixed(first_ident, name));
        }
        if input.peek(token::Paren) {
            let content;
            parenthesized!(content in input);
            return Self::parse_call(first_ident, &content);
        }

        Ok(KeyAction::StandardKey(KeyRef::Ident(first_ident.to_string()), first_ident.span()))
    }
}

#[derive(Debug)]
enum AttrValue {
    Str(LitStr),
    Int(LitInt),
    BracketGroup(Group),
    Path(Path),
}

impl AttrValue {
    fn span(&self) -> Span {
        match self {
            AttrValue::Str(v) => v.span(),
            AttrValue::Int(v) => v.span(),
            AttrValue::BracketGroup(v) => v.span(),
            AttrValue::Path(v) => v.span(),
        }
    }
}

impl Parse for AttrValue {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(AttrValue::Str(input.parse()?));
        }
        if input.peek(LitInt) {
            return Ok(AttrValue::Int(input.parse()?));
        }
        if input.peek(token::Bracket) {
            let g = input.parse::<Group>()?;
            if g.delimiter() == Delimiter::Bracket {
                return Ok(AttrValue::BracketGroup(g));
            }
        }
        if input.peek(Ident) || input.peek(Token![::]) || input.peek(Token![crate]) {
            return Ok(AttrValue::Path(input.parse()?));
        }

        Err(syn::Error::new(input.span(), "Unrecognized attribute value type"))
    }
}

#[derive(Debug)]
struct Attr {
    key: Ident,
    value: AttrValue,
}

impl Attr {
    fn key_name(&self) -> String {
        format!("{}", self.key)
    }

    fn require_value_str(&self) -> syn::Result<LitStr> {
        match &self.value {
            AttrValue::Str(lit_str) => Ok(lit_str.clone()),
            _ => Err(syn::Error::new(
                self.value.span(),
                format!("Expected string value for attribute {}", self.key_name()),
            )),
        }
    }

    fn require_value_bracket_group(&self) -> syn::Result<Group> {
        match &self.value {
            AttrValue::BracketGroup(group) => Ok(group.clone()),
            _ => Err(syn::Error::new(
                self.value.span(),
                format!("Expected square brackets value for attribute {}", self.key_name()),
            )),
        }
    }

    fn require_value_path(&self) -> syn::Result<Path> {
        match &self.value {
            AttrValue::Path(path) => Ok(path.clone()),
            _ => Err(syn::Error::new(
                self.value.span(),
                format!("Expected a macro path for attribute {}", self.key_name()),
            )),
        }
    }
}

impl Parse for Attr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key = input.parse::<Ident>()?;
        input.parse::<Token![:]>()?;
        let value = input.parse::<AttrValue>()?;
        Ok(Attr { key, value })
    }
}

struct AttrSetDef {
    attrs: Punctuated<Attr, Token![,]>,
}

impl Parse for AttrSetDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(AttrSetDef { attrs: input.parse_terminated(Attr::parse, Token![,])? })
    }
}

fn ensure_unset<A: Spanned>(current_attr: &Attr, attr_value_holder: &Option<A>) -> syn::Result<()> {
    if let Some(lit) = attr_value_holder {
        let mut e = syn::Error::new(current_attr.key.span(), "Attribute value already set previously.");
        e.combine(syn::Error::new(lit.span(), "Previously set here"));
        return Err(e);
    }

    Ok(())
}

fn require_attr<A>(span: Span, attr: &str, holder: Option<A>) -> syn::Result<A> {
    holder.ok_or_else(|| syn::Error::new(span, format!("Required attribute not found: {}", attr)))
}

#[derive(Debug, Clone)]
struct LayerRow<K> {
    span: Span,
    actions: Vec<K>,
}

impl Parse for LayerRow<KeyAction> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        let bracket = bracketed!(content in input);
        let actions = content.parse_terminated(KeyAction::parse, Token![,])?.into_iter().collect::<Vec<_>>();

        Ok(LayerRow { span: bracket.span.join(), actions })
    }
}

#[derive(Debug, Clone)]
struct LayerDef {
    rows_span: Span,
    name: LitStr,
    rows: Vec<LayerRow<KeyAction>>,
}

fn parse_group_list<T>(group: Group, item: fn(ParseStream) -> syn::Result<T>) -> syn::Result<Vec<T>> {
    let parser = |input: ParseStream| -> syn::Result<Vec<T>> {
        Ok(input.parse_terminated(item, Token![,])?.into_iter().collect::<Vec<_>>())
    };

    Parser::parse2(parser, group.stream())
}

impl Parse for LayerDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        const ATTR_NAME: &str = "name";
        const ATTR_ROWS: &str = "rows";

        let content;
        braced!(content in input);
        let attrs = content.parse::<AttrSetDef>()?.attrs;

        let mut name_attr: Option<LitStr> = None;
        let mut rows_attr: Option<Group> = None;

        for attr in attrs.into_iter() {
            match attr.key_name().as_str() {
                ATTR_NAME => {
                    ensure_unset(&attr, &name_attr)?;
                    name_attr.replace(attr.require_value_str()?);
                }
                ATTR_ROWS => {
                    ensure_unset(&attr, &rows_attr)?;
                    rows_attr.replace(attr.require_value_bracket_group()?);
                }
                value => {
                    return Err(syn::Error::new(
                        attr.key.span(),
                        format!("Unknown attribute in layer definition: {}", value),
                    ));
                }
            }
        }

        let rows = require_attr(content.span(), ATTR_ROWS, rows_attr)?;

        Ok(LayerDef {
            rows_span: rows.span(),
            name: require_attr(content.span(), ATTR_NAME, name_attr)?,
            rows: parse_group_list(rows, LayerRow::parse)?,
        })
    }
}

/// Input of the `layers!` macro.
struct KeymapDef {
    alias_resolver: Option<Path>,
    layers: Vec<LayerDef>,
}

impl Parse for KeymapDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        const ATTR_ALIAS_RESOLVER: &str = "alias_resolver";
        const ATTR_LAYERS: &str = "layers";

        let attrs = input.parse::<AttrSetDef>()?.attrs;

        let mut resolver_attr: Option<Path> = None;
        let mut layers_attr: Option<Group> = None;

        for attr in attrs.into_iter() {
            match attr.key_name().as_str() {
                ATTR_ALIAS_RESOLVER => {
                    ensure_unset(&attr, &resolver_attr)?;
                    resolver_attr.replace(attr.require_value_path()?);
                }
                ATTR_LAYERS => {
                    ensure_unset(&attr, &layers_attr)?;
                    layers_attr.replace(attr.require_value_bracket_group()?);
                }
                value => {
                    return Err(syn::Error::new(attr.key.span(), format!("Unknown attribute: {}", value)));
                }
            }
        }

        let layers = require_attr(input.span(), ATTR_LAYERS, layers_attr)?;

        Ok(KeymapDef { alias_resolver: resolver_attr, layers: parse_group_list(layers, LayerDef::parse)? })
    }
}

struct GeneratedLayer {
    name: String,
    rows: Vec<LayerRow<TokenStream>>,
}

impl KeymapDef {
    fn check_dimensions(&self) -> syn::Result<()> {
        fn ensure_rows_same_length(layer: &LayerDef) -> syn::Result<usize> {
            let Some(expected_cols) = layer.rows.first().map(|r| r.actions.len()) else {
                return Ok(0);
            };

            for row in layer.rows.iter() {
                if row.actions.len() != expected_cols {
                    return Err(syn::Error::new(
                        row.span,
                        format!(
                            "Expected every row to have the same dimension. Expected {} elements, but {} got.",
                            expected_cols,
                            row.actions.len()
                        ),
                    ));
                }
            }

            Ok(expected_cols)
        }

        fn track_visited_layer(defined_layers: &mut Vec<String>, next: &LitStr) -> syn::Result<()> {
            let name = next.value();
            if defined_layers.contains(&name) {
                Err(syn::Error::new(next.span(), format!("Layer already defined: {}", &name)))
            } else {
                defined_layers.push(name);
                Ok(())
            }
        }

        let Some(first_layer) = self.layers.first() else {
            return Err(syn::Error::new(Span::call_site(), "At least one layer must be defined"));
        };

        let expected_col_count = ensure_rows_same_length(first_layer)?;
        let expected_row_count = first_layer.rows.len();
        let mut already_defined_layers = Vec::new();

        let r = self
            .layers
            .iter()
            .map(|layer| {
                let col_count = ensure_rows_same_length(layer)?;
                if expected_col_count != col_count || expected_row_count != layer.rows.len() {
                    return Err(syn::Error::new(
                        layer.rows_span,
                        format!(
                            "Expected every layer to have the same dimensions as the firstly defined layer. Expected a layer of {}x{}, but found {}x{}.",
                            expected_row_count,
                            expected_col_count,
                            layer.rows.len(),
                            col_count
                        ),
                    ));
                }

                track_visited_layer(&mut already_defined_layers, &layer.name)
            })
            .collect::<ResultAcc<_, _>>();

        match combine_syn_errors(&r.errors) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn layer_index(&self, layer: &LayerRef) -> syn::Result<Literal> {
        let index = match layer {
            LayerRef::Name(name) => self.layers.iter().position(|l| l.name.value() == name.value()).ok_or_else(|| {
                syn::Error::new(name.span(), format!("Couldn't find a layer with name '{}'", name.value()))
            })?,
            LayerRef::Index(lit) => {
                let index = lit.base10_parse::<usize>()?;
                if index >= self.layers.len() {
                    return Err(syn::Error::new(
                        lit.span(),
                        format!("Layer index {} out of range, only {} layers defined", index, self.layers.len()),
                    ));
                }
                index
            }
        };

        Ok(Literal::u8_suffixed(index as u8))
    }

    /// Resolves a key that translates to a single key code, possibly
    /// with some modifiers held.
    fn basic_key(&self, action: &KeyAction) -> syn::Result<(u8, Ident)> {
        match action {
            KeyAction::StandardKey(key, span) => match keymap::translate_standard_key(key, *span) {
                Some((ident, true)) => Ok((0x02, ident)),
                Some((ident, false)) => Ok((0, ident)),
                None => Err(syn::Error::new(*span, format!("Unsupported key: {}", key))),
            },
            KeyAction::Modified(func, inner) => {
                let (mods, ident) = self.basic_key(inner)?;
                let bits = keymap::modifier_bits(&func.to_string()).unwrap_or(0);
                Ok((mods | bits, ident))
            }
            other => Err(syn::Error::new(other.span(), "Expected a plain key here")),
        }
    }

    fn plain_key(&self, action: &KeyAction) -> syn::Result<Ident> {
        match self.basic_key(action)? {
            (0, ident) => Ok(ident),
            _ => Err(syn::Error::new(action.span(), "Tap keys cannot carry modifiers")),
        }
    }

    #[allow(non_snake_case)]
    fn action_tokens(&self, action: &KeyAction) -> syn::Result<TokenStream> {
        let Action = ktkb_symbol("keys", "Action");
        let LayerAction = ktkb_symbol("keys", "LayerAction");
        let ActivateOn = ktkb_symbol("keys", "ActivateOn");
        let KeyCode = ktkb_symbol("hid", "KeyCode");
        let Mods = ktkb_symbol("hid", "Mods");

        let tokens = match action {
            KeyAction::Transparent(_) => quote! { #Action::Transparent },
            KeyAction::NoOp(_) => quote! { #Action::NoOp },
            KeyAction::StandardKey(..) | KeyAction::Modified(..) => match self.basic_key(action)? {
                (0, key) => quote! { #Action::Key(#KeyCode::#key) },
                (mods, key) => {
                    let mods = Literal::u8_suffixed(mods);
                    quote! { #Action::Modified(#Mods::from_bits_retain(#mods), #KeyCode::#key) }
                }
            },
            KeyAction::ModTap(func, inner) => {
                let mods = Literal::u8_suffixed(keymap::mod_tap_bits(&func.to_string()).unwrap_or(0));
                let key = self.plain_key(inner)?;
                quote! { #Action::ModTap(#Mods::from_bits_retain(#mods), #KeyCode::#key) }
            }
            KeyAction::LayerTap(_, layer, inner) => {
                let layer = self.layer_index(layer)?;
                let key = self.plain_key(inner)?;
                quote! { #Action::Layer(#LayerAction::LayerTap(#layer, #KeyCode::#key)) }
            }
            KeyAction::Layer(func, layer) => {
                let layer = self.layer_index(layer)?;
                let layer_action = match func.to_string().as_str() {
                    "mo" => quote! { #LayerAction::Momentary(#layer) },
                    "tg" => quote! { #LayerAction::Toggle(#layer) },
                    "to" => quote! { #LayerAction::To(#layer, #ActivateOn::Press) },
                    "tor" => quote! { #LayerAction::To(#layer, #ActivateOn::Release) },
                    "tt" => quote! { #LayerAction::TapToggle(#layer) },
                    _ => quote! { #LayerAction::DefaultSet(#layer) },
                };
                quote! { #Action::Layer(#layer_action) }
            }
            KeyAction::Prefixed(prefix, name) => match prefix.to_string().as_str() {
                "c" => {
                    let ConsumerKey = ktkb_symbol("hid", "ConsumerKey");
                    quote! { #Action::Consumer(#ConsumerKey::#name) }
                }
                "m" => {
                    let MouseKey = ktkb_symbol("keys", "MouseKey");
                    quote! { #Action::Mouse(#MouseKey::#name) }
                }
                "rgb" => {
                    let RgbAction = ktkb_symbol("keys", "RgbAction");
                    quote! { #Action::Rgb(#RgbAction::#name) }
                }
                "fw" => {
                    let FirmwareAction = ktkb_symbol("keys", "FirmwareAction");
                    quote! { #Action::Firmware(#FirmwareAction::#name) }
                }
                "u" => {
                    let Some(resolver) = &self.alias_resolver else {
                        return Err(syn::Error::new(
                            prefix.span(),
                            "Custom keys need an alias_resolver attribute to be resolved",
                        ));
                    };
                    quote! { #Action::Custom(#resolver!(u:#name)) }
                }
                other => {
                    return Err(syn::Error::new(prefix.span(), format!("Unknown key prefix: {}", other)));
                }
            },
        };

        Ok(tokens)
    }

    fn generate_layer(&self, layer: &LayerDef) -> syn::Result<GeneratedLayer> {
        let rows = layer
            .rows
            .iter()
            .map(|row| {
                let r = row.actions.iter().map(|action| self.action_tokens(action)).collect::<ResultAcc<_, _>>();
                match combine_syn_errors(&r.errors) {
                    Some(err) => Err(err),
                    None => Ok(LayerRow { span: row.span, actions: r.oks }),
                }
            })
            .collect::<ResultAcc<_, _>>();

        if let Some(err) = combine_syn_errors(&rows.errors) {
            return Err(err);
        }

        Ok(GeneratedLayer { name: layer.name.value(), rows: rows.oks })
    }

    fn generate(&self) -> syn::Result<TokenStream> {
        self.check_dimensions()?;

        let r = self.layers.iter().map(|layer| self.generate_layer(layer)).collect::<ResultAcc<_, _>>();
        if let Some(err) = combine_syn_errors(&r.errors) {
            return Err(err);
        }

        let layers = r.oks;
        Ok(quote! {
            [
                #(#layers),*
            ]
        })
    }
}

impl ToTokens for LayerRow<TokenStream> {
    #[allow(non_snake_case)]
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let LayerRow = ktkb_symbol("keymap", "LayerRow");
        let actions = &self.actions;
        tokens.append_all(quote! {
            #LayerRow::new([
                #(#actions),*
            ])
        })
    }
}

impl ToTokens for GeneratedLayer {
    #[allow(non_snake_case)]
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let LayoutLayer = ktkb_symbol("keymap", "LayoutLayer");
        let name = &self.name;
        let rows = &self.rows;
        tokens.append_all(quote! {
            #LayoutLayer::new(#name, [
                #(#rows),*
            ])
        });
    }
}

/// Builds the layers of a keymap.
///
/// ```ignore
/// layers!(
///     alias_resolver: custom_key_from_alias,
///     layers: [
///         {
///             name: "base",
///             rows: [
///                 [Esc, 1, 2, lt("nav", Spc), u:Eprm],
///             ]
///         },
///         {
///             name: "nav",
///             rows: [
///                 [*, lctl('!'), c:VolumeUp, *, tor("base")],
///             ]
///         },
///     ]
/// )
/// ```
///
/// Expands to an array of `LayoutLayer`, in the order they are
/// defined.
#[proc_macro]
pub fn layers(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as KeymapDef);

    match input.generate() {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
