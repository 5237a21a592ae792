use super::*;

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns false if the process was already present.
    pub fn add_process(&mut self, uid: ProcessId) -> bool {
        self.processes.insert(uid)
    }
    /// Adds an undirected edge, and its endpoints if they are new.
    pub fn add_edge(
        &mut self,
        a: ProcessId,
        b: ProcessId,
        weight: Weight,
    ) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        let EdgeKey { low, high, .. } = EdgeKey::new(a, b, weight);
        if self.edges.contains_key(&(low, high)) {
            return Err(GraphError::DuplicateEdge { low, high });
        }
        self.processes.insert(low);
        self.processes.insert(high);
        self.edges.insert((low, high), weight);
        Ok(())
    }
    pub fn processes(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.processes.iter().copied()
    }
    /// All edges in ascending edge order.
    pub fn edges(&self) -> Vec<EdgeKey> {
        let mut keys: Vec<EdgeKey> = self
            .edges
            .iter()
            .map(|(&(low, high), &weight)| EdgeKey { weight, low, high })
            .collect();
        keys.sort();
        keys
    }
    pub fn num_processes(&self) -> usize {
        self.processes.len()
    }
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    // Creates the shared edges, and for each process the edges incident on it.
    pub(crate) fn build_edges(
        &self,
    ) -> Result<(Vec<Arc<Edge>>, BTreeMap<ProcessId, Vec<Arc<Edge>>>), GraphError> {
        let mut incident: BTreeMap<ProcessId, Vec<Arc<Edge>>> =
            self.processes.iter().map(|&uid| (uid, vec![])).collect();
        let mut edges = Vec::with_capacity(self.edges.len());
        for (&(low, high), &weight) in self.edges.iter() {
            let edge = Arc::new(Edge::new(low, high, weight)?);
            for uid in edge.endpoints().iter() {
                incident.entry(*uid).or_default().push(edge.clone());
            }
            edges.push(edge);
        }
        Ok((edges, incident))
    }

    /// Parses a connectivity matrix:
    /// ```text
    /// # comment
    /// 3
    /// 1 2 3
    /// 0 1 3
    /// 1 0 2
    /// 3 2 0
    /// ```
    /// The first line holds the number of processes, the second their ids, then one
    /// row of weights per process. `-1` and the diagonal mean "no edge".
    pub fn parse(text: &str) -> Result<Self, GraphError> {
        use GraphError as Ge;
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (line_no, line) = lines.next().ok_or(Ge::Malformed { line: 0, reason: "empty input" })?;
        let n: usize =
            line.parse().map_err(|_| Ge::Malformed { line: line_no, reason: "bad process count" })?;

        let mut last_line = line_no;
        let mut graph = Graph::new();
        let ids: Vec<ProcessId> = if n == 0 {
            vec![]
        } else {
            let (line_no, line) =
                lines.next().ok_or(Ge::Malformed { line: line_no, reason: "missing ids" })?;
            let ids = line
                .split_whitespace()
                .map(|tok| tok.parse::<u32>().map(ProcessId))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| Ge::Malformed { line: line_no, reason: "bad process id" })?;
            last_line = line_no;
            if ids.len() != n {
                return Err(Ge::Malformed { line: line_no, reason: "wrong number of ids" });
            }
            for &uid in ids.iter() {
                if !graph.add_process(uid) {
                    return Err(Ge::DuplicateProcess(uid));
                }
            }
            ids
        };

        let mut matrix: Vec<Vec<Option<Weight>>> = Vec::with_capacity(n);
        for row_index in 0..n {
            let missing = Ge::Malformed { line: last_line, reason: "missing matrix row" };
            let (line_no, line) = lines.next().ok_or(missing)?;
            last_line = line_no;
            let row = line
                .split_whitespace()
                .enumerate()
                .map(|(column, tok)| match tok.parse::<i64>() {
                    Ok(w) if w < 0 || column == row_index => Ok(None),
                    Ok(w) => Ok(Some(w as Weight)),
                    Err(_) => Err(Ge::Malformed { line: line_no, reason: "bad weight" }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if row.len() != n {
                return Err(Ge::Malformed { line: line_no, reason: "wrong row length" });
            }
            matrix.push(row);
        }
        if let Some((line_no, _)) = lines.next() {
            return Err(Ge::Malformed { line: line_no, reason: "trailing input" });
        }

        for row in 0..n {
            for column in (row + 1)..n {
                if matrix[row][column] != matrix[column][row] {
                    return Err(Ge::AsymmetricWeight { row: ids[row], column: ids[column] });
                }
                if let Some(weight) = matrix[row][column] {
                    graph.add_edge(ids[row], ids[column], weight)?;
                }
            }
        }
        Ok(graph)
    }
}
impl std::str::FromStr for Graph {
    type Err = GraphError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
