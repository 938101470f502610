//! One-call compilation of a [`GraphProgram`].

use fusegraph_ir::GraphProgram;
use tracing::{info, instrument};

use crate::assemble::{Assembler, CompiledCircuit};
use crate::decompose::decompose;
use crate::error::CompileResult;

/// Decompose, register, fuse, correct and assemble `program`.
#[instrument(skip(program), fields(nodes = program.graph.num_nodes(), edges = program.graph.num_edges()))]
pub fn compile(program: &GraphProgram) -> CompileResult<CompiledCircuit> {
    program.validate()?;

    let clusters = decompose(&program.graph)?;
    info!("Decomposed graph into {} clusters", clusters.len());

    let mut assembler = Assembler::new(program.angles.clone(), program.outputs.clone());
    for cluster in clusters {
        assembler.add_cluster(cluster)?;
    }
    assembler
        .discover_fusions()?
        .apply_corrections(&program.corrections)?;
    assembler.assemble()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::registry::PhotonRole;
    use fusegraph_ir::{Graph, IrError, NodeId};

    #[test]
    fn test_compile_bell() {
        let graph = Graph::from_parts([0u32, 1], [(0, 1)]).unwrap();
        let program = GraphProgram::new(graph)
            .with_correction(1u32, 6)
            .with_outputs([0u32, 1]);
        let circuit = compile(&program).unwrap();
        assert_eq!(circuit.num_photons(), 2);
        assert_eq!(circuit.photons_with_role(PhotonRole::Readout).count(), 2);
        assert!(circuit.fusions.is_empty());
    }

    #[test]
    fn test_compile_rejects_unknown_annotation() {
        let graph = Graph::from_parts([0u32, 1], [(0, 1)]).unwrap();
        let program = GraphProgram::new(graph).with_angle(3u32, 0.5);
        let err = compile(&program).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Ir(IrError::UnknownNode { node: NodeId(3), .. })
        ));
    }

    #[test]
    fn test_compile_empty_program() {
        let circuit = compile(&GraphProgram::new(Graph::new())).unwrap();
        assert_eq!(circuit.num_photons(), 0);
        assert_eq!(circuit.network.num_modes(), 0);
    }
}
