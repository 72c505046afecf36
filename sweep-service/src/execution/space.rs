// Parameter Space
// Ordered parameter definitions and Cartesian-product enumeration

use std::fmt;

use crate::error::SetupError;

/// A single swept parameter: a flag name and its candidate values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Flag name as it appears on the command line (e.g. `-m`, `--screen`)
    pub name: String,
    /// Candidate values, in declaration order
    pub values: Vec<String>,
}

/// An ordered set of parameters defining one sweep.
///
/// Declaration order is significant twice over: it fixes the argument layout
/// of every generated command line, and it fixes the enumeration order of
/// combinations (later parameters vary fastest).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSpace {
    params: Vec<Parameter>,
}

impl ParameterSpace {
    /// Create an empty parameter space
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// The parameters in declaration order
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Number of parameters in the space
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the space declares no parameters at all
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Total number of combinations the space enumerates.
    ///
    /// The product of candidate counts: any parameter with zero candidates
    /// makes this zero, and a space with no parameters has exactly one
    /// (empty) combination.
    pub fn combination_count(&self) -> usize {
        self.params.iter().map(|p| p.values.len()).product()
    }

    /// Lazily enumerate every combination in odometer order.
    ///
    /// The last-declared parameter varies fastest. Re-invoking on the same
    /// space reproduces the identical sequence.
    pub fn combinations(&self) -> Combinations<'_> {
        Combinations::new(self)
    }

    /// Lazily enumerate every full command line for `program`.
    pub fn argument_vectors<'a>(
        &'a self,
        program: &'a str,
    ) -> impl ExactSizeIterator<Item = ArgumentVector> + 'a {
        self.combinations().map(move |c| c.to_argv(program))
    }
}

/// Builder for constructing a [`ParameterSpace`] programmatically
pub struct SpaceBuilder {
    params: Vec<Parameter>,
}

impl SpaceBuilder {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter with a list of candidate values
    pub fn param(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.params.push(Parameter {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add a parameter with a single candidate value
    pub fn value(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.param(name, [value.into()])
    }

    /// Build the space, rejecting duplicate parameter names
    pub fn build(self) -> Result<ParameterSpace, SetupError> {
        for (i, param) in self.params.iter().enumerate() {
            if self.params[..i].iter().any(|p| p.name == param.name) {
                return Err(SetupError::DuplicateParameter(param.name.clone()));
            }
        }
        Ok(ParameterSpace {
            params: self.params,
        })
    }
}

impl Default for SpaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One fully-assigned point in a parameter space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    /// One `(name, value)` pair per parameter, in space order
    pub pairs: Vec<(String, String)>,
}

impl Combination {
    /// Render this combination as a concrete command line for `program`.
    ///
    /// Layout: the program token, then for each parameter its name token
    /// followed by its value token. A parameter whose chosen value is the
    /// empty string still contributes both tokens.
    pub fn to_argv(&self, program: &str) -> ArgumentVector {
        let mut tokens = Vec::with_capacity(1 + 2 * self.pairs.len());
        tokens.push(program.to_string());
        for (name, value) in &self.pairs {
            tokens.push(name.clone());
            tokens.push(value.clone());
        }
        ArgumentVector { tokens }
    }
}

/// The command-line form of a combination: program token plus
/// `name value` token pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector {
    tokens: Vec<String>,
}

impl ArgumentVector {
    /// Build a vector from raw tokens. The first token is the program path.
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// The program path (first token)
    pub fn program(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    /// Every token after the program path
    pub fn args(&self) -> &[String] {
        if self.tokens.is_empty() {
            &[]
        } else {
            &self.tokens[1..]
        }
    }

    /// All tokens including the program path
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Total token count (1 + 2 x parameter count for enumerated vectors)
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for ArgumentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if token.is_empty() || token.chars().any(char::is_whitespace) {
                write!(f, "'{}'", token)?;
            } else {
                write!(f, "{}", token)?;
            }
        }
        Ok(())
    }
}

/// Lazy odometer-order iterator over the combinations of a space.
///
/// The iterator is exact-sized: the remaining count is always known without
/// materializing the product.
pub struct Combinations<'a> {
    space: &'a ParameterSpace,
    indices: Vec<usize>,
    remaining: usize,
}

impl<'a> Combinations<'a> {
    fn new(space: &'a ParameterSpace) -> Self {
        Self {
            space,
            indices: vec![0; space.len()],
            remaining: space.combination_count(),
        }
    }

    /// Advance the odometer: bump the last index, carrying leftward on
    /// overflow.
    fn advance(&mut self) {
        for i in (0..self.indices.len()).rev() {
            self.indices[i] += 1;
            if self.indices[i] < self.space.params[i].values.len() {
                return;
            }
            self.indices[i] = 0;
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Combination> {
        if self.remaining == 0 {
            return None;
        }

        let pairs = self
            .space
            .params
            .iter()
            .zip(&self.indices)
            .map(|(param, &i)| (param.name.clone(), param.values[i].clone()))
            .collect();

        self.advance();
        self.remaining -= 1;

        Some(Combination { pairs })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> ParameterSpace {
        SpaceBuilder::new()
            .param("-a", ["1", "2"])
            .param("-b", ["x", "y"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_odometer_order() {
        let space = two_by_two();
        let vectors: Vec<Vec<String>> = space
            .argument_vectors("prog")
            .map(|v| v.tokens().to_vec())
            .collect();

        assert_eq!(
            vectors,
            vec![
                vec!["prog", "-a", "1", "-b", "x"],
                vec!["prog", "-a", "1", "-b", "y"],
                vec!["prog", "-a", "2", "-b", "x"],
                vec!["prog", "-a", "2", "-b", "y"],
            ]
        );
    }

    #[test]
    fn test_count_and_vector_length() {
        let space = SpaceBuilder::new()
            .param("-a", ["1", "2", "3"])
            .param("-b", ["x", "y"])
            .value("-c", "only")
            .build()
            .unwrap();

        assert_eq!(space.combination_count(), 6);

        let vectors: Vec<ArgumentVector> = space.argument_vectors("prog").collect();
        assert_eq!(vectors.len(), 6);
        for vector in &vectors {
            assert_eq!(vector.len(), 1 + 2 * 3);
            assert_eq!(vector.program(), "prog");
        }
    }

    #[test]
    fn test_enumeration_is_restartable() {
        let space = two_by_two();
        let first: Vec<Combination> = space.combinations().collect();
        let second: Vec<Combination> = space.combinations().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_candidate_list_yields_nothing() {
        let space = SpaceBuilder::new()
            .param("-a", ["1", "2"])
            .param("-b", Vec::<String>::new())
            .build()
            .unwrap();

        assert_eq!(space.combination_count(), 0);
        assert_eq!(space.combinations().count(), 0);
    }

    #[test]
    fn test_no_parameters_yields_program_only() {
        let space = ParameterSpace::new();
        let vectors: Vec<ArgumentVector> = space.argument_vectors("./run").collect();

        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].tokens(), ["./run"]);
    }

    #[test]
    fn test_empty_value_still_emits_flag() {
        let space = SpaceBuilder::new().value("-o", "").build().unwrap();
        let vectors: Vec<ArgumentVector> = space.argument_vectors("prog").collect();

        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].tokens(), ["prog", "-o", ""]);
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let result = SpaceBuilder::new()
            .value("-a", "1")
            .value("-a", "2")
            .build();

        assert!(matches!(result, Err(SetupError::DuplicateParameter(name)) if name == "-a"));
    }

    #[test]
    fn test_exact_size_decreases() {
        let space = two_by_two();
        let mut iter = space.combinations();

        assert_eq!(iter.len(), 4);
        iter.next();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.count(), 3);
    }

    #[test]
    fn test_display_quotes_empty_tokens() {
        let argv = ArgumentVector::from_tokens(vec![
            "prog".to_string(),
            "-o".to_string(),
            String::new(),
        ]);
        assert_eq!(argv.to_string(), "prog -o ''");
    }
}
