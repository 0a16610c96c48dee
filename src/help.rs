use crate::styles::Styles;

const SPECIFIERS: &str = "\
  looksee ls OBJECT [SPECIFIERS]...
    Print the method lookup path of OBJECT.

    Available specifiers:

    :public
    :protected
    :private
    :undefined
    :overridden
      Print methods with this visibility.

    :nopublic
    :noprotected
    :noprivate
    :noundefined
    :nooverridden
      Do not print methods with this visibility.

    string
      Print methods containing this string.

    /regexp/
    /regexp/i
      Print methods matching this regexp.

  looksee which OBJECT METHOD
    Print the module that defines METHOD for OBJECT, and where.

  looksee edit OBJECT METHOD
    Jump to the source of METHOD. Set your editor with LOOKSEE_EDITOR
    or EDITOR; %f and %l stand for the file and line.
";

/// The quick reference, with the style legend drawn in `styles`.
pub fn quick_reference(styles: &Styles) -> String {
    let legend = [
        styles.module.apply("Module"),
        styles.public.apply("public"),
        styles.protected.apply("protected"),
        styles.private.apply("private"),
        styles.undefined.apply("undefined"),
        styles.overridden.apply("overridden"),
    ];

    let mut out = String::from("== Looksee Quick Reference\n\n");
    out.push_str(SPECIFIERS);
    out.push_str("\n  Styles:\n\n");
    for line in legend {
        out.push_str("    ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}
